pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn user_email_index_key(email: &str) -> String {
    format!("email:{}", email.to_lowercase())
}

pub fn session_key(token_hash: &str) -> String {
    token_hash.to_string()
}

pub fn session_user_index_key(user_id: &str, token_hash: &str) -> String {
    format!("user:{}:{}", user_id, token_hash)
}

pub fn session_user_index_prefix(user_id: &str) -> String {
    format!("user:{}:", user_id)
}

pub fn book_key(book_id: &str) -> String {
    book_id.to_string()
}

// Uniqueness anchor for the per-user wrong-note book; value is the book id.
pub fn wrong_note_index_key(user_id: &str) -> String {
    format!("wrongnote:{}", user_id)
}

pub fn book_word_key(book_id: &str, word_id: &str) -> String {
    format!("{}:{}", book_id, word_id)
}

pub fn book_words_prefix(book_id: &str) -> String {
    format!("{}:", book_id)
}

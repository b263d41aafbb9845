pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const BOOKS: &str = "books";
pub const BOOK_WORDS: &str = "book_words";
pub const META: &str = "meta";

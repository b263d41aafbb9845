//! Input validation shared by the auth and book routes.

/// Registration only enforces a 6-character floor; existing accounts were
/// created under that rule and must keep logging in.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    if password.len() > 256 {
        return Err("Password must be at most 256 characters");
    }
    Ok(())
}

/// Email format check: user@domain.tld
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let parts: Vec<&str> = email.splitn(2, '@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if !local
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'+' || b == b'-')
    {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return false;
    }
    domain
        .split('.')
        .all(|part| !part.is_empty() && !part.starts_with('-') && !part.ends_with('-'))
}

/// Book titles: non-empty after trimming, at most 100 characters.
pub fn validate_book_title(title: &str) -> Result<(), &'static str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title is required");
    }
    if trimmed.chars().count() > 100 {
        return Err("Title must be at most 100 characters");
    }
    Ok(())
}

/// Word fields: both sides non-empty after trimming.
pub fn validate_word_fields(eng: &str, kor: &str) -> Result<(), &'static str> {
    if eng.trim().is_empty() || kor.trim().is_empty() {
        return Err("Both the word and its meaning are required");
    }
    Ok(())
}

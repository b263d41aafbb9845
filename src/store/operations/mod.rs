pub mod books;
pub mod sessions;
pub mod users;
pub mod words;

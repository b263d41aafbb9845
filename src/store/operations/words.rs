use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: String,
    pub book_id: String,
    pub eng: String,
    pub kor: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn add_word(&self, entry: &WordEntry) -> Result<(), StoreError> {
        let key = keys::book_word_key(&entry.book_id, &entry.id);
        self.book_words
            .insert(key.as_bytes(), Self::serialize(entry)?)?;
        Ok(())
    }

    /// Words of one book, newest first (the order the detail screen shows).
    pub fn list_book_words(&self, book_id: &str) -> Result<Vec<WordEntry>, StoreError> {
        let prefix = keys::book_words_prefix(book_id);
        let mut words = Vec::new();
        for item in self.book_words.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            words.push(Self::deserialize::<WordEntry>(&v)?);
        }
        words.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(words)
    }

    pub fn count_book_words(&self, book_id: &str) -> Result<u64, StoreError> {
        let prefix = keys::book_words_prefix(book_id);
        let mut count = 0u64;
        for item in self.book_words.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    /// Returns true when the book already holds an entry with this exact `eng`.
    pub fn book_contains_eng(&self, book_id: &str, eng: &str) -> Result<bool, StoreError> {
        let prefix = keys::book_words_prefix(book_id);
        for item in self.book_words.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            let entry: WordEntry = Self::deserialize(&v)?;
            if entry.eng == eng {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Removes one entry; returns false when it was already gone.
    pub fn delete_word(&self, book_id: &str, word_id: &str) -> Result<bool, StoreError> {
        let key = keys::book_word_key(book_id, word_id);
        Ok(self.book_words.remove(key.as_bytes())?.is_some())
    }
}

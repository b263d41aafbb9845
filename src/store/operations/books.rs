use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::store::keys;
use crate::store::operations::words::WordEntry;
use crate::store::{Store, StoreError};

/// Reserved title of the system-managed wrong-answer book.
pub const WRONG_NOTE_TITLE: &str = "오답노트 ⭐️";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub kind: BookKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BookKind {
    Normal,
    WrongNote,
}

impl Book {
    pub fn is_wrong_note(&self) -> bool {
        self.kind == BookKind::WrongNote
    }
}

/// Result of routing a missed quiz word into the wrong-note book.
#[derive(Debug, Clone)]
pub struct WrongAnswerRecord {
    pub book_id: String,
    pub book_created: bool,
    pub word_added: bool,
}

impl Store {
    pub fn create_book(&self, book: &Book) -> Result<(), StoreError> {
        let key = keys::book_key(&book.id);
        self.books.insert(key.as_bytes(), Self::serialize(book)?)?;
        Ok(())
    }

    pub fn get_book(&self, book_id: &str) -> Result<Option<Book>, StoreError> {
        // Index rows share this tree under colon-separated keys; real book
        // ids are bare UUIDs. A crafted id must not read an index row.
        if book_id.contains(':') {
            return Ok(None);
        }
        let key = keys::book_key(book_id);
        match self.books.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Books of one user in creation order, the order the home list shows.
    pub fn list_user_books(&self, user_id: &str) -> Result<Vec<Book>, StoreError> {
        let mut books = Vec::new();
        for item in self.books.iter() {
            let (k, v) = item?;
            // Skip index rows; book rows are keyed by bare UUID.
            if k.starts_with(b"wrongnote:") {
                continue;
            }
            let book: Book = Self::deserialize(&v)?;
            if book.user_id == user_id {
                books.push(book);
            }
        }
        books.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    pub fn rename_book(&self, book_id: &str, new_title: &str) -> Result<Book, StoreError> {
        let mut book = self
            .get_book(book_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "book".to_string(),
                key: book_id.to_string(),
            })?;

        book.title = new_title.to_string();
        let key = keys::book_key(book_id);
        self.books.insert(key.as_bytes(), Self::serialize(&book)?)?;
        Ok(book)
    }

    /// Removes the book row and its entire word subtree in one transaction.
    pub fn delete_book_with_words(&self, book_id: &str) -> Result<(), StoreError> {
        let book = self.get_book(book_id)?;

        let prefix = keys::book_words_prefix(book_id);
        let mut word_keys: Vec<Vec<u8>> = Vec::new();
        for item in self.book_words.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            word_keys.push(k.to_vec());
        }

        let book_key = keys::book_key(book_id).into_bytes();
        let wrong_note_index = book
            .as_ref()
            .filter(|b| b.is_wrong_note())
            .map(|b| keys::wrong_note_index_key(&b.user_id).into_bytes());

        (&self.books, &self.book_words)
            .transaction(|(tx_books, tx_words)| {
                tx_books.remove(book_key.as_slice())?;
                if let Some(ref idx) = wrong_note_index {
                    tx_books.remove(idx.as_slice())?;
                }
                for k in &word_keys {
                    tx_words.remove(k.as_slice())?;
                }
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<()>| match e {
                sled::transaction::TransactionError::Abort(()) => {
                    StoreError::Sled(sled::Error::Unsupported("transaction aborted".into()))
                }
                sled::transaction::TransactionError::Storage(se) => StoreError::Sled(se),
            })?;

        Ok(())
    }

    pub fn get_wrong_note_book(&self, user_id: &str) -> Result<Option<Book>, StoreError> {
        let index_key = keys::wrong_note_index_key(user_id);
        let Some(book_id_raw) = self.books.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let book_id = match String::from_utf8(book_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in wrong-note index");
                return Ok(None);
            }
        };
        self.get_book(&book_id)
    }

    /// Gets the user's wrong-note book, creating it when absent.
    ///
    /// Creation claims the `wrongnote:<uid>` index key with a compare-and-swap
    /// first, so two quiz failures racing on the same fresh account still end
    /// up with exactly one wrong-note book.
    pub fn ensure_wrong_note_book(&self, user_id: &str) -> Result<(Book, bool), StoreError> {
        if let Some(existing) = self.get_wrong_note_book(user_id)? {
            return Ok((existing, false));
        }

        let book = Book {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: WRONG_NOTE_TITLE.to_string(),
            kind: BookKind::WrongNote,
            created_at: Utc::now(),
        };

        let index_key = keys::wrong_note_index_key(user_id);
        let cas_result = self
            .books
            .compare_and_swap(
                index_key.as_bytes(),
                None::<&[u8]>,
                Some(book.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if cas_result.is_err() {
            // Lost the race; the winner's book is the canonical one.
            let winner = self
                .get_wrong_note_book(user_id)?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "book".to_string(),
                    key: index_key,
                })?;
            return Ok((winner, false));
        }

        if let Err(e) = self.create_book(&book) {
            let _ = self.books.remove(index_key.as_bytes());
            return Err(e);
        }

        Ok((book, true))
    }

    /// Inserts a missed quiz word into the wrong-note book, creating the book
    /// first when needed. Insertion is skipped when the book already holds an
    /// entry with the same `eng`, compared byte-for-byte.
    pub fn record_wrong_answer(
        &self,
        user_id: &str,
        eng: &str,
        kor: &str,
    ) -> Result<WrongAnswerRecord, StoreError> {
        let (book, book_created) = self.ensure_wrong_note_book(user_id)?;

        if !book_created && self.book_contains_eng(&book.id, eng)? {
            return Ok(WrongAnswerRecord {
                book_id: book.id,
                book_created,
                word_added: false,
            });
        }

        let entry = WordEntry {
            id: uuid::Uuid::new_v4().to_string(),
            book_id: book.id.clone(),
            eng: eng.to_string(),
            kor: kor.to_string(),
            created_at: Utc::now(),
        };
        self.add_word(&entry)?;

        Ok(WrongAnswerRecord {
            book_id: book.id,
            book_created,
            word_added: true,
        })
    }
}

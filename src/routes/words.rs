use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::events::{ChangeEvent, ChangeKind};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::words::WordEntry;
use crate::validation::validate_word_fields;

/// Word routes live under the book resource, so this router is merged into
/// the books router rather than nested on its own path.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/words", get(list_words).post(add_word))
        .route("/:id/words/bulk", post(add_words_bulk))
        .route("/:id/words/:word_id", axum::routing::delete(delete_word))
}

async fn list_words(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    super::books::owned_book(&state, &auth, &id)?;
    let words = state.store().list_book_words(&id)?;
    Ok(ok(words))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddWordRequest {
    eng: String,
    kor: String,
}

async fn add_word(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddWordRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let book = super::books::owned_book(&state, &auth, &id)?;
    reject_wrong_note_writes(&book)?;

    if let Err(msg) = validate_word_fields(&req.eng, &req.kor) {
        return Err(AppError::bad_request("WORD_INVALID", msg));
    }

    let entry = WordEntry {
        id: uuid::Uuid::new_v4().to_string(),
        book_id: id.clone(),
        eng: req.eng.trim().to_string(),
        kor: req.kor.trim().to_string(),
        created_at: Utc::now(),
    };
    state.store().add_word(&entry)?;

    state.events().publish(ChangeEvent {
        user_id: auth.user_id,
        kind: ChangeKind::WordAdded,
        book_id: id,
    });

    Ok(created(entry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkAddRequest {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkAddResponse {
    added: usize,
    skipped: usize,
}

async fn add_words_bulk(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<BulkAddRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let book = super::books::owned_book(&state, &auth, &id)?;
    reject_wrong_note_writes(&book)?;

    let pairs = parse_bulk_lines(&req.text);
    let skipped = req.text.lines().filter(|l| !l.trim().is_empty()).count() - pairs.len();

    for (eng, kor) in &pairs {
        let entry = WordEntry {
            id: uuid::Uuid::new_v4().to_string(),
            book_id: id.clone(),
            eng: eng.clone(),
            kor: kor.clone(),
            created_at: Utc::now(),
        };
        state.store().add_word(&entry)?;
    }

    if !pairs.is_empty() {
        state.events().publish(ChangeEvent {
            user_id: auth.user_id,
            kind: ChangeKind::WordAdded,
            book_id: id,
        });
    }

    Ok(ok(BulkAddResponse {
        added: pairs.len(),
        skipped,
    }))
}

async fn delete_word(
    auth: AuthUser,
    Path((id, word_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    super::books::owned_book(&state, &auth, &id)?;

    if !state.store().delete_word(&id, &word_id)? {
        return Err(AppError::not_found("Word not found"));
    }

    state.events().publish(ChangeEvent {
        user_id: auth.user_id,
        kind: ChangeKind::WordRemoved,
        book_id: id,
    });

    Ok(ok(serde_json::json!({"deleted": true})))
}

/// Quiz failures are the only writer of the wrong-note book; the word
/// endpoints refuse it so its dedup invariant cannot be bypassed.
fn reject_wrong_note_writes(
    book: &crate::store::operations::books::Book,
) -> Result<(), AppError> {
    if book.is_wrong_note() {
        return Err(AppError::forbidden(
            "BOOK_RESERVED",
            "Words cannot be added to the wrong-note book directly",
        ));
    }
    Ok(())
}

/// Parses pasted bulk text into (eng, kor) pairs.
///
/// Each line is split on `:`, `-`, and TAB; the first field becomes `eng`,
/// the second `kor`, both trimmed.
/// Lines with fewer than two fields, or whose first two fields trim to empty,
/// are dropped. Fields past the second are ignored. There is no escaping, so
/// a hyphenated word in the first field splits wrong; accepted limitation.
fn parse_bulk_lines(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, [':', '-', '\t']);
            let eng = fields.next()?.trim();
            let kor = fields.next()?.trim();
            if eng.is_empty() || kor.is_empty() {
                return None;
            }
            Some((eng.to_string(), kor.to_string()))
        })
        .collect()
}

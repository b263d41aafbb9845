use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::events::{ChangeEvent, ChangeKind};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::books::{Book, BookKind, WRONG_NOTE_TITLE};
use crate::validation::validate_book_title;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/:id", patch(rename_book).delete(delete_book))
        .merge(super::words::router())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookSummary {
    id: String,
    title: String,
    kind: BookKind,
    word_count: u64,
    created_at: DateTime<Utc>,
}

async fn list_books(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let books = state.store().list_user_books(&auth.user_id)?;

    let mut summaries = Vec::with_capacity(books.len());
    for book in books {
        let word_count = state.store().count_book_words(&book.id)?;
        summaries.push(BookSummary {
            id: book.id,
            title: book.title,
            kind: book.kind,
            word_count,
            created_at: book.created_at,
        });
    }

    Ok(ok(summaries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookRequest {
    title: String,
}

async fn create_book(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateBookRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let title = req.title.trim();
    if let Err(msg) = validate_book_title(title) {
        return Err(AppError::bad_request("BOOK_INVALID_TITLE", msg));
    }
    // The wrong-note book is system-managed; a hand-typed reserved title
    // would break its uniqueness invariant.
    if title == WRONG_NOTE_TITLE {
        return Err(AppError::conflict(
            "BOOK_RESERVED_TITLE",
            "This title is reserved",
        ));
    }

    let book = Book {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: auth.user_id.clone(),
        title: title.to_string(),
        kind: BookKind::Normal,
        created_at: Utc::now(),
    };

    state.store().create_book(&book)?;
    state.events().publish(ChangeEvent {
        user_id: auth.user_id,
        kind: ChangeKind::BookCreated,
        book_id: book.id.clone(),
    });

    Ok(created(book))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameBookRequest {
    title: String,
}

async fn rename_book(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RenameBookRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let book = owned_book(&state, &auth, &id)?;

    if book.is_wrong_note() {
        return Err(AppError::forbidden(
            "BOOK_RESERVED",
            "The wrong-note book cannot be renamed",
        ));
    }

    let title = req.title.trim();
    if let Err(msg) = validate_book_title(title) {
        return Err(AppError::bad_request("BOOK_INVALID_TITLE", msg));
    }
    if title == WRONG_NOTE_TITLE {
        return Err(AppError::conflict(
            "BOOK_RESERVED_TITLE",
            "This title is reserved",
        ));
    }

    let renamed = state.store().rename_book(&id, title)?;
    state.events().publish(ChangeEvent {
        user_id: auth.user_id,
        kind: ChangeKind::BookRenamed,
        book_id: id,
    });

    Ok(ok(renamed))
}

async fn delete_book(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    owned_book(&state, &auth, &id)?;

    state.store().delete_book_with_words(&id)?;
    state.events().publish(ChangeEvent {
        user_id: auth.user_id,
        kind: ChangeKind::BookDeleted,
        book_id: id,
    });

    Ok(ok(serde_json::json!({"deleted": true})))
}

/// Fetches a book and enforces ownership. 404 for missing books and for
/// other users' books alike, so ids cannot be probed.
pub(super) fn owned_book(
    state: &AppState,
    auth: &AuthUser,
    book_id: &str,
) -> Result<Book, AppError> {
    state
        .store()
        .get_book(book_id)?
        .filter(|b| b.user_id == auth.user_id)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

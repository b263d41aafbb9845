use axum::extract::State;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::events::{ChangeEvent, ChangeKind};
use crate::extractors::JsonBody;
use crate::quiz::{Direction, Question, QuizError, QuizSession, QuizWord, Verdict};
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_quiz).get(current_question).delete(abandon_quiz))
        .route("/answer", post(submit_answer))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartQuizRequest {
    book_ids: Vec<String>,
    direction: Direction,
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizStateBody {
    finished: bool,
    question: Option<Question>,
}

async fn start_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StartQuizRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    // Snapshot the pool up front; edits made after this point never reach
    // the running session. A book selected twice still contributes its
    // words once.
    let mut seen = std::collections::HashSet::new();
    let mut pool: Vec<QuizWord> = Vec::new();
    for book_id in &req.book_ids {
        if !seen.insert(book_id.as_str()) {
            continue;
        }
        super::books::owned_book(&state, &auth, book_id)?;
        let words = state.store().list_book_words(book_id)?;
        pool.extend(words.iter().map(QuizWord::from));
    }

    let session =
        QuizSession::start(pool, req.direction, req.count, &mut rand::thread_rng()).map_err(
            |e| match e {
                QuizError::EmptyPool => AppError::bad_request(
                    "QUIZ_EMPTY_SELECTION",
                    "The selected books contain no words",
                ),
                QuizError::Finished => AppError::internal("fresh session cannot be finished"),
            },
        )?;

    let question = session.question();
    state.quizzes().install(&auth.user_id, session).await;

    Ok(created(QuizStateBody {
        finished: false,
        question,
    }))
}

async fn current_question(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let question = state
        .quizzes()
        .question(&auth.user_id)
        .await
        .ok_or_else(|| AppError::not_found("No active quiz session"))?;

    Ok(ok(QuizStateBody {
        finished: question.is_none(),
        question,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "result")]
enum AnswerBody {
    #[serde(rename_all = "camelCase")]
    Correct {
        finished: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        next: Option<Question>,
    },
    #[serde(rename_all = "camelCase")]
    Incorrect {
        expected: String,
        question: Question,
    },
}

async fn submit_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let verdict = state
        .quizzes()
        .submit(&auth.user_id, &req.answer)
        .await
        .ok_or_else(|| AppError::not_found("No active quiz session"))?
        .map_err(|e| match e {
            QuizError::Finished => {
                AppError::conflict("QUIZ_FINISHED", "The quiz session is already finished")
            }
            QuizError::EmptyPool => AppError::internal("running session has an empty pool"),
        })?;

    let body = match verdict {
        Verdict::Correct { finished, next } => AnswerBody::Correct { finished, next },
        Verdict::Incorrect {
            expected,
            missed,
            question,
        } => {
            record_missed_word(&state, &auth.user_id, &missed);
            AnswerBody::Incorrect { expected, question }
        }
    };

    Ok(ok(body))
}

async fn abandon_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if !state.quizzes().remove(&auth.user_id).await {
        return Err(AppError::not_found("No active quiz session"));
    }
    Ok(ok(serde_json::json!({"abandoned": true})))
}

/// Routes a missed word into the wrong-note book and publishes the resulting
/// change events. Failures are logged, not surfaced: the answer verdict must
/// reach the client even when the side write fails.
fn record_missed_word(state: &AppState, user_id: &str, missed: &QuizWord) {
    match state
        .store()
        .record_wrong_answer(user_id, &missed.eng, &missed.kor)
    {
        Ok(record) => {
            if record.book_created {
                state.events().publish(ChangeEvent {
                    user_id: user_id.to_string(),
                    kind: ChangeKind::BookCreated,
                    book_id: record.book_id.clone(),
                });
            }
            if record.word_added {
                state.events().publish(ChangeEvent {
                    user_id: user_id.to_string(),
                    kind: ChangeKind::WordAdded,
                    book_id: record.book_id,
                });
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to record wrong answer");
        }
    }
}

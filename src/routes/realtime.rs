use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{extract::State, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

/// Streams the caller's own change events as SSE.
///
/// Each book/word mutation becomes a `change` event; a lagged subscriber gets
/// a single `resync` event telling it to refetch instead of trusting the gap.
pub async fn sse_handler(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut events_rx = state.events().subscribe();
    let mut shutdown_rx = state.shutdown_rx();
    let user_id = auth.user_id;

    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                received = events_rx.recv() => {
                    match received {
                        Ok(event) => {
                            if event.user_id != user_id {
                                continue;
                            }
                            if let Ok(json) = serde_json::to_string(&event) {
                                yield Ok(Event::default().event("change").data(json));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "SSE subscriber lagged, requesting resync");
                            yield Ok(Event::default().event("resync").data("{}"));
                        }
                        Err(RecvError::Closed) => {
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}

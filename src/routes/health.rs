use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(ok(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
    })))
}

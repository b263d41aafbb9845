use axum::http::Method;
use axum::Router;

use super::http::{request, response_json};

/// Registers a fresh throwaway account and returns its access token.
pub async fn register_and_get_token(app: &Router) -> String {
    let email = format!("user-{}@test.com", uuid::Uuid::new_v4());
    register_with_email(app, &email).await
}

pub async fn register_with_email(app: &Router, email: &str) -> String {
    let response = request(
        app,
        Method::POST,
        "/api/auth/register",
        Some(serde_json::json!({
            "email": email,
            "password": "Passw0rd!",
        })),
        &[],
    )
    .await;

    let (status, _headers, body) = response_json(response).await;
    assert!(status.is_success(), "register failed: {body}");

    body["data"]["accessToken"]
        .as_str()
        .expect("access token in register response")
        .to_string()
}

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{
    generate_dummy_argon2_hash, hash_password, hash_token, sign_jwt_for_user, verify_password,
    AuthUser,
};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::sessions::Session;
use crate::store::operations::users::User;
use crate::validation::{is_valid_email, validate_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.clone(),
            email: value.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// Issue an access token and persist its session record.
fn issue_token(user_id: &str, state: &AppState) -> Result<String, AppError> {
    let access_token = sign_jwt_for_user(
        user_id,
        &state.config().jwt_secret,
        state.config().jwt_expires_in_hours,
    )?;

    let token_hash = hash_token(&access_token);
    state.store().create_session(&Session {
        token_hash,
        user_id: user_id.to_string(),
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::hours(state.config().jwt_expires_in_hours as i64),
        revoked: false,
    })?;

    Ok(access_token)
}

async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::bad_request(
            "AUTH_INVALID_EMAIL",
            "Invalid email format",
        ));
    }
    if let Err(msg) = validate_password(&req.password) {
        return Err(AppError::bad_request("AUTH_WEAK_PASSWORD", msg));
    }

    if state.store().get_user_by_email(&email)?.is_some() {
        return Err(AppError::conflict(
            "AUTH_EMAIL_EXISTS",
            "Email already registered",
        ));
    }

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.clone(),
        password_hash: hash_password(&req.password)?,
        created_at: now,
        updated_at: now,
    };

    // The existence pre-check races with concurrent registrations; the CAS
    // in create_user is authoritative and its conflict keeps the same shape.
    if let Err(e) = state.store().create_user(&user) {
        return Err(match e {
            crate::store::StoreError::Conflict { .. } => {
                AppError::conflict("AUTH_EMAIL_EXISTS", "Email already registered")
            }
            other => other.into(),
        });
    }

    let access_token = issue_token(&user.id, &state)?;

    let payload = AuthResponse {
        access_token: access_token.clone(),
        user: UserProfile::from(&user),
    };

    let mut response = created(payload).into_response();
    set_token_cookie(&mut response, &access_token)?;
    Ok(response)
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    // Registration trims the email; lookups must tolerate the same padding.
    let user = state.store().get_user_by_email(req.email.trim())?;

    // Verify against a dummy hash when the account doesn't exist so the
    // response time doesn't leak which emails are registered.
    let verified = match &user {
        Some(user) => verify_password(&req.password, &user.password_hash)?,
        None => {
            let _ = verify_password(&req.password, &generate_dummy_argon2_hash());
            false
        }
    };

    let Some(user) = user.filter(|_| verified) else {
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    let access_token = issue_token(&user.id, &state)?;

    let payload = AuthResponse {
        access_token: access_token.clone(),
        user: UserProfile::from(&user),
    };

    let mut response = ok(payload).into_response();
    set_token_cookie(&mut response, &access_token)?;
    Ok(response)
}

async fn logout(auth: AuthUser, State(state): State<AppState>) -> Result<Response, AppError> {
    state.store().delete_user_sessions(&auth.user_id)?;

    let mut response = ok(serde_json::json!({"loggedOut": true})).into_response();
    clear_token_cookie(&mut response)?;
    Ok(response)
}

async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    Ok(ok(UserProfile::from(&user)))
}

fn set_token_cookie(response: &mut Response, token: &str) -> Result<(), AppError> {
    let cookie = format!("token={token}; Path=/; SameSite=Strict; HttpOnly; Secure");
    append_set_cookie(response, &cookie, "token cookie set failed")
}

fn clear_token_cookie(response: &mut Response) -> Result<(), AppError> {
    append_set_cookie(
        response,
        "token=; Path=/; Max-Age=0; SameSite=Strict; HttpOnly; Secure",
        "token cookie clear failed",
    )
}

fn append_set_cookie(
    response: &mut Response,
    cookie: &str,
    error_context: &str,
) -> Result<(), AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::internal(&format!("{error_context}: {e}")))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

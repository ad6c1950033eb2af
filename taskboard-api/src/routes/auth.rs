/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account and receive a token
/// - `POST /api/auth/login` - Exchange credentials for a token
/// - `GET /api/auth/me` - Caller's own profile

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use taskboard_shared::auth::authorization::AuthContext;
use taskboard_shared::models::UserProfile;
use taskboard_shared::service::{AuthSession, LoginRequest, RegisterRequest};

/// Register and login response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,

    pub token: String,

    pub user: UserProfile,
}

impl SessionResponse {
    fn new(message: &str, session: AuthSession) -> Self {
        Self {
            message: message.to_string(),
            token: session.token,
            user: session.user,
        }
    }
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 validation_error`: bad username, email or password
/// - `400 conflict`: username or email already taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = state.auth.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new("User created successfully", session)),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 validation_error`: email or password missing
/// - `401 invalid_credentials`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.auth.login(req).await?;
    Ok(Json(SessionResponse::new("Login successful", session)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.auth.profile(auth.user_id).await?))
}

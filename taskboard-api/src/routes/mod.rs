/// API route handlers
///
/// - `health`: Liveness and store connectivity
/// - `auth`: Register, login, caller profile
/// - `tasks`: Owner-scoped task CRUD
/// - `public`: Unauthenticated task CRUD in default-user mode
/// - `users`: Per-user task listing

use axum::http::Uri;

use crate::error::ApiError;

pub mod auth;
pub mod health;
pub mod public;
pub mod tasks;
pub mod users;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

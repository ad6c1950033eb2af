/// Service error taxonomy
///
/// Every Auth Service and Task Service operation returns [`ServiceResult`].
/// The HTTP boundary maps each variant onto exactly one status code, so the
/// variants are chosen by what the caller is allowed to learn, not by where
/// the failure happened. In particular an absent record and a record owned by
/// someone else are both [`ServiceError::NotFound`].

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;
use crate::validation::FieldError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the domain services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Client payload violates one or more field constraints
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// A unique field (username or email) is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No bearer token was presented
    #[error("Authentication token required")]
    MissingToken,

    /// Bearer token failed signature, issuer or expiry checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated, but not entitled to the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Record absent, or not owned by the caller
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected storage or infrastructure failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                ServiceError::Conflict(format!("Duplicate value violates {}", constraint))
            }
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<Vec<FieldError>> for ServiceError {
    fn from(errors: Vec<FieldError>) -> Self {
        ServiceError::Validation(errors)
    }
}

/// Flattens `validator` derive output into field errors, ordered by field
impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<FieldError> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldError::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::Validation(errors)
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

/// Token failures on the verification path; signing failures are mapped
/// to `Internal` where tokens are issued
impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            other => ServiceError::InvalidToken(other.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::NotFound("Task");
        assert_eq!(err.to_string(), "Task not found");

        let err = ServiceError::from(vec![FieldError::new("title", "Title is required")]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[test]
    fn test_store_conflict_becomes_conflict() {
        let err: ServiceError = StoreError::Conflict("users_email_key".to_string()).into();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg.contains("users_email_key")));
    }

    #[test]
    fn test_token_errors() {
        assert!(matches!(ServiceError::from(JwtError::Expired), ServiceError::InvalidToken(_)));
        assert!(matches!(
            ServiceError::from(JwtError::CreateError("boom".to_string())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn test_authz_becomes_forbidden() {
        assert!(matches!(
            ServiceError::from(AuthzError::NotAuthorized),
            ServiceError::Forbidden(_)
        ));
    }

    #[test]
    fn test_store_backend_becomes_internal() {
        let err: ServiceError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}

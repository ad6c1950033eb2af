/// Caller identity and ownership checks
///
/// Every authenticated request carries an [`AuthContext`] built from the
/// validated token claims. Task access is restricted through the context's
/// [`Scope`]; per-user resources go through [`require_self`].
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{require_self, AuthContext};
/// use taskboard_shared::auth::jwt::Claims;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let auth = AuthContext::from(Claims::new(user_id, "alice"));
///
/// assert!(require_self(&auth, user_id).is_ok());
/// assert!(require_self(&auth, Uuid::new_v4()).is_err());
/// ```

use uuid::Uuid;

use super::jwt::Claims;
use crate::models::task::Scope;

/// Error type for authorization checks
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is authenticated but acting on another user's resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            username: claims.username,
        }
    }
}

impl AuthContext {
    /// Restricts task access to the caller's own tasks
    pub fn scope(&self) -> Scope {
        Scope::Owner(self.user_id)
    }
}

/// Ensures the caller is the user the resource belongs to
pub fn require_self(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != user_id {
        return Err(AuthzError::NotAuthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext::from(Claims::new(user_id, "alice"));

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.scope(), Scope::Owner(user_id));
    }

    #[test]
    fn test_require_self() {
        let auth = AuthContext {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        };

        assert!(require_self(&auth, auth.user_id).is_ok());
        assert_eq!(require_self(&auth, Uuid::new_v4()), Err(AuthzError::NotAuthorized));
    }
}

//! Auth Service
//!
//! Registers users, checks credentials, issues and verifies bearer tokens.
//! Unknown emails and wrong passwords fail with the same
//! [`ServiceError::InvalidCredentials`] so callers cannot discover which
//! accounts exist.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::authorization::AuthContext;
use crate::auth::jwt::{bearer_token, create_token, validate_token, Claims};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{normalize_email, User, UserProfile, DEFAULT_EMAIL, DEFAULT_USERNAME};
use crate::store::UserStore;
use crate::validation::no_nul_chars;

/// Registration request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 50, message = "Username must be between 1 and 50 characters"),
        custom(function = "no_nul_chars")
    )]
    pub username: String,

    #[validate(
        email(message = "Email must be a valid email address"),
        custom(function = "no_nul_chars")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RegisterRequest {
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(
        length(min = 1, message = "Email is required"),
        custom(function = "no_nul_chars")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issued token plus the caller's public profile
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            users,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Creates an account and signs the new user in
    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<AuthSession> {
        let req = req.normalized();
        req.validate()?;

        if req.username == DEFAULT_USERNAME || req.email == DEFAULT_EMAIL {
            return Err(ServiceError::Conflict("Username or email is reserved".to_string()));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }
        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(ServiceError::Conflict("Username already taken".to_string()));
        }

        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        // A racing registration still loses on the unique constraints
        let user = self
            .users
            .insert(User::new(&req.username, &req.email, password_hash))
            .await?;

        info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Verifies credentials and issues a fresh token
    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<AuthSession> {
        let req = LoginRequest {
            email: req.email.trim().to_string(),
            password: req.password,
        };
        req.validate()?;

        let Some(user) = self.users.find_by_email(&req.email).await? else {
            debug!("Login for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let password = req.password;
        let hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;

        if !matches {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    /// Resolves an `Authorization` header value to the caller
    ///
    /// An absent header or a non-bearer scheme is `MissingToken`; a bearer
    /// token that fails signature, issuer or expiry checks is `InvalidToken`.
    pub fn verify_token(&self, header: Option<&str>) -> ServiceResult<AuthContext> {
        let token = header.and_then(bearer_token).ok_or(ServiceError::MissingToken)?;
        let claims = validate_token(token, &self.jwt_secret)?;
        Ok(AuthContext::from(claims))
    }

    /// Caller's own profile
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    fn session(&self, user: User) -> ServiceResult<AuthSession> {
        let token = create_token(&Claims::new(user.id, user.username.clone()), &self.jwt_secret)?;
        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }
}

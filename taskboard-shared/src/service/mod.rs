//! Business services driven by the HTTP boundary
//!
//! - [`auth`]: registration, login, token verification, caller profile
//! - [`tasks`]: owner-scoped and public-mode task CRUD

pub mod auth;
pub mod tasks;

pub use auth::{AuthService, AuthSession, LoginRequest, RegisterRequest};
pub use tasks::TaskService;

//! # Taskboard Shared Library
//!
//! This crate contains the domain layer of Taskboard: models, validation,
//! persistence, authentication primitives and the business services that the
//! HTTP API drives.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks and their views
//! - `validation`: Accumulating field validation for task payloads and filters
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, JWT tokens, caller context
//! - `service`: Auth Service and Task Service
//! - `error`: Service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{ServiceError, ServiceResult};

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

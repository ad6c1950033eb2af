//! Persistence boundary for users and tasks
//!
//! The services only ever talk to the [`UserStore`] and [`TaskStore`]
//! traits. Two backends implement them:
//!
//! - [`postgres`]: `sqlx` over PostgreSQL, used in production
//! - [`memory`]: `tokio` locks over in-process collections, used by tests and
//!   the `STORAGE_BACKEND=memory` development mode
//!
//! Every task lookup takes a [`Scope`]; an owner-scoped lookup of a task
//! owned by someone else behaves exactly like a lookup of a missing task.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::{Scope, Task, TaskChanges, TaskFilter};
use crate::models::user::User;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Unique constraint guarding usernames
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Unique constraint guarding emails
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Connection, query or backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(
                    db_err.constraint().unwrap_or("unique").to_string(),
                );
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Credential store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user; `Conflict` if username or email is taken
    async fn insert(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks up by normalized email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Loads every user whose ID is listed; unknown IDs are skipped
    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// Returns the user holding `user.username`, inserting `user` first if
    /// nobody does. Concurrent callers all observe the same record.
    async fn get_or_create(&self, user: User) -> StoreResult<User>;
}

/// Task store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> StoreResult<Task>;

    async fn find(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>>;

    /// Tasks matching every set filter, oldest first
    async fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// Applies `changes` and returns the updated task, or `None` if the task
    /// is not visible under `scope`
    async fn update(&self, id: Uuid, scope: Scope, changes: TaskChanges)
        -> StoreResult<Option<Task>>;

    /// Removes the task and returns it, or `None` if not visible under `scope`
    async fn delete(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>>;

    /// Connectivity check for the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

/// The pair of stores the services run on
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            tasks: Arc::new(PgTaskStore::new(pool)),
        }
    }

    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

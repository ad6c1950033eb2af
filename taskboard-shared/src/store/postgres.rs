//! PostgreSQL stores
//!
//! Thin adapters from the store traits onto the `sqlx` operations defined on
//! the models.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::task::{Scope, Task, TaskChanges, TaskFilter};
use crate::models::user::User;

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        Ok(User::create(&self.pool, &user).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(User::find_many(&self.pool, ids).await?)
    }

    async fn get_or_create(&self, user: User) -> StoreResult<User> {
        Ok(User::get_or_create(&self.pool, &user).await?)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: Task) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, &task).await?)
    }

    async fn find(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>> {
        Ok(Task::find(&self.pool, id, scope).await?)
    }

    async fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(Task::list(&self.pool, filter).await?)
    }

    async fn update(
        &self,
        id: Uuid,
        scope: Scope,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, scope, changes).await?)
    }

    async fn delete(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>> {
        Ok(Task::delete(&self.pool, id, scope).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

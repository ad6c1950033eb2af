//! Task Service
//!
//! Two modes over one store:
//!
//! - **Authenticated**: every operation runs under the caller's
//!   [`Scope::Owner`], so another user's task is indistinguishable from a
//!   missing one.
//! - **Public**: reads and writes are unscoped; new tasks are attached to the
//!   lazily created default user.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::authorization::{require_self, AuthContext};
use crate::auth::password::{hash_password, random_password};
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{PublicTask, Scope, Task, TaskFilter};
use crate::models::user::{OwnerSummary, User, DEFAULT_EMAIL, DEFAULT_USERNAME};
use crate::store::{TaskStore, UserStore};
use crate::validation::{validate_new_task, validate_task_changes, TaskPayload, TaskQuery};

const DEFAULT_PASSWORD_LEN: usize = 32;

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    /// Creates a task owned by the caller
    #[instrument(skip(self, auth, payload), fields(user_id = %auth.user_id))]
    pub async fn create(&self, auth: &AuthContext, payload: TaskPayload) -> ServiceResult<Task> {
        let new_task = validate_new_task(&payload)?;

        // The token may outlive its account
        if self.users.find_by_id(auth.user_id).await?.is_none() {
            return Err(ServiceError::InvalidToken("User no longer exists".to_string()));
        }

        let task = self.tasks.insert(Task::new(auth.user_id, new_task)).await?;
        info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    /// Creates a task owned by the default user
    #[instrument(skip(self, payload))]
    pub async fn create_public(&self, payload: TaskPayload) -> ServiceResult<Task> {
        let new_task = validate_new_task(&payload)?;
        let owner = self.default_user().await?;

        let task = self.tasks.insert(Task::new(owner.id, new_task)).await?;
        info!(task_id = %task.id, "Public task created");
        Ok(task)
    }

    /// Caller's tasks matching the query, oldest first
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id))]
    pub async fn list(&self, auth: &AuthContext, query: TaskQuery) -> ServiceResult<Vec<Task>> {
        let filter = query.into_filter()?.scoped(auth.scope());
        Ok(self.tasks.list(&filter).await?)
    }

    /// Every task matching the query, any owner
    #[instrument(skip(self))]
    pub async fn list_public(&self, query: TaskQuery) -> ServiceResult<Vec<PublicTask>> {
        let filter = query.into_filter()?.scoped(Scope::Public);
        let tasks = self.tasks.list(&filter).await?;
        self.with_owners(tasks).await
    }

    #[instrument(skip(self, auth), fields(user_id = %auth.user_id))]
    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<Task> {
        self.find(id, auth.scope()).await
    }

    #[instrument(skip(self))]
    pub async fn get_public(&self, id: Uuid) -> ServiceResult<PublicTask> {
        let task = self.find(id, Scope::Public).await?;
        self.with_owner(task).await
    }

    /// Applies the supplied fields to one of the caller's tasks
    #[instrument(skip(self, auth, payload), fields(user_id = %auth.user_id))]
    pub async fn update(
        &self,
        auth: &AuthContext,
        id: Uuid,
        payload: TaskPayload,
    ) -> ServiceResult<Task> {
        self.apply_update(id, auth.scope(), payload).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_public(&self, id: Uuid, payload: TaskPayload) -> ServiceResult<PublicTask> {
        let task = self.apply_update(id, Scope::Public, payload).await?;
        self.with_owner(task).await
    }

    /// Removes one of the caller's tasks and returns it
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id))]
    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<Task> {
        self.remove(id, auth.scope()).await
    }

    #[instrument(skip(self))]
    pub async fn delete_public(&self, id: Uuid) -> ServiceResult<Task> {
        self.remove(id, Scope::Public).await
    }

    /// Tasks of `user_id`, visible only to that same user
    #[instrument(skip(self, auth), fields(caller = %auth.user_id))]
    pub async fn list_for_user(
        &self,
        auth: &AuthContext,
        user_id: Uuid,
    ) -> ServiceResult<Vec<Task>> {
        require_self(auth, user_id)?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User"));
        }

        let filter = TaskFilter::default().scoped(Scope::Owner(user_id));
        Ok(self.tasks.list(&filter).await?)
    }

    /// Returns the default user, creating it on first use
    ///
    /// Creation goes through the store's get-or-create, so concurrent first
    /// writes converge on a single record. Its password is random and never
    /// revealed, so the account cannot be logged into.
    pub async fn default_user(&self) -> ServiceResult<User> {
        if let Some(user) = self.users.find_by_username(DEFAULT_USERNAME).await? {
            return Ok(user);
        }

        let password_hash =
            tokio::task::spawn_blocking(|| hash_password(&random_password(DEFAULT_PASSWORD_LEN)))
                .await??;

        let user = self
            .users
            .get_or_create(User::new(DEFAULT_USERNAME, DEFAULT_EMAIL, password_hash))
            .await?;
        debug!(user_id = %user.id, "Default user resolved");
        Ok(user)
    }

    async fn find(&self, id: Uuid, scope: Scope) -> ServiceResult<Task> {
        self.tasks
            .find(id, scope)
            .await?
            .ok_or(ServiceError::NotFound("Task"))
    }

    async fn apply_update(
        &self,
        id: Uuid,
        scope: Scope,
        payload: TaskPayload,
    ) -> ServiceResult<Task> {
        let changes = validate_task_changes(&payload)?;

        let task = self
            .tasks
            .update(id, scope, changes)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;
        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    async fn remove(&self, id: Uuid, scope: Scope) -> ServiceResult<Task> {
        let task = self
            .tasks
            .delete(id, scope)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;
        info!(task_id = %task.id, "Task deleted");
        Ok(task)
    }

    async fn with_owner(&self, task: Task) -> ServiceResult<PublicTask> {
        let owner = self.users.find_by_id(task.user_id).await?;
        Ok(PublicTask {
            owner: owner.as_ref().map(OwnerSummary::from),
            task,
        })
    }

    async fn with_owners(&self, tasks: Vec<Task>) -> ServiceResult<Vec<PublicTask>> {
        let mut ids: Vec<Uuid> = tasks.iter().map(|t| t.user_id).collect();
        ids.sort();
        ids.dedup();

        let owners: HashMap<Uuid, OwnerSummary> = self
            .users
            .find_many(&ids)
            .await?
            .iter()
            .map(|u| (u.id, OwnerSummary::from(u)))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|task| PublicTask {
                owner: owners.get(&task.user_id).cloned(),
                task,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MockTaskStore, MockUserStore, StoreError};
    use serde_json::json;

    fn payload(value: serde_json::Value) -> TaskPayload {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_internal() {
        let mut tasks = MockTaskStore::new();
        tasks
            .expect_find()
            .returning(|_, _| Err(StoreError::Backend("connection reset".to_string())));

        let service = TaskService::new(Arc::new(tasks), Arc::new(MockUserStore::new()));
        let auth = AuthContext {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        };

        let result = service.get(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_store() {
        let service = TaskService::new(
            Arc::new(MockTaskStore::new()),
            Arc::new(MockUserStore::new()),
        );

        let result = service
            .create_public(payload(json!({ "title": "  ", "priority": "urgent" })))
            .await;

        match result {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "title"));
                assert!(errors.iter().any(|e| e.field == "priority"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_for_user_checks_caller_before_store() {
        let service = TaskService::new(
            Arc::new(MockTaskStore::new()),
            Arc::new(MockUserStore::new()),
        );
        let auth = AuthContext {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        };

        let result = service.list_for_user(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }
}

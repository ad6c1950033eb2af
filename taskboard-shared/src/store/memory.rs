//! In-memory stores
//!
//! Each operation holds the collection lock for its whole duration, so
//! uniqueness checks and get-or-create are atomic with respect to other
//! callers.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::models::task::{Scope, Task, TaskChanges, TaskFilter};
use crate::models::user::{normalize_email, User};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn check_unique(users: &[User], candidate: &User) -> StoreResult<()> {
    if users.iter().any(|u| u.username == candidate.username) {
        return Err(StoreError::Conflict(USERNAME_CONSTRAINT.to_string()));
    }
    if users.iter().any(|u| u.email == candidate.email) {
        return Err(StoreError::Conflict(EMAIL_CONSTRAINT.to_string()));
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        check_unique(&users, &user)?;
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let username = username.trim();
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn get_or_create(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter().find(|u| u.username == user.username) {
            return Ok(existing.clone());
        }
        check_unique(&users, &user)?;
        users.push(user.clone());
        Ok(user)
    }
}

/// Tasks kept in insertion order, which is creation order
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: Task) -> StoreResult<Task> {
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn find(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .find(|t| t.id == id && scope.permits(t))
            .cloned())
    }

    async fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn update(
        &self,
        id: Uuid,
        scope: Scope,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .iter_mut()
            .find(|t| t.id == id && scope.permits(t))
            .map(|task| {
                task.apply(changes);
                task.clone()
            }))
    }

    async fn delete(&self, id: Uuid, scope: Scope) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .iter()
            .position(|t| t.id == id && scope.permits(t))
            .map(|index| tasks.remove(index)))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{NewTask, Priority};

    fn user(name: &str) -> User {
        User::new(name, &format!("{}@example.com", name), "hash".to_string())
    }

    fn task(owner: Uuid, title: &str) -> Task {
        Task::new(
            owner,
            NewTask {
                title: title.to_string(),
                description: String::new(),
                completed: false,
                priority: Priority::Medium,
                due_date: None,
            },
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_username_and_email() {
        let store = MemoryUserStore::new();
        store.insert(user("alice")).await.unwrap();

        let same_name = User::new("alice", "other@example.com", "hash".to_string());
        assert_eq!(
            store.insert(same_name).await,
            Err(StoreError::Conflict(USERNAME_CONSTRAINT.to_string()))
        );

        let same_email = User::new("bob", "ALICE@example.com", "hash".to_string());
        assert_eq!(
            store.insert(same_email).await,
            Err(StoreError::Conflict(EMAIL_CONSTRAINT.to_string()))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let store = MemoryUserStore::new();
        let alice = store.insert(user("alice")).await.unwrap();

        let found = store.find_by_email(" Alice@Example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let store = MemoryUserStore::new();
        let first = store.get_or_create(user("default")).await.unwrap();
        let second = store.get_or_create(user("default")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_scoped_lookups_hide_foreign_tasks() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let t = store.insert(task(owner, "mine")).await.unwrap();

        assert!(store.find(t.id, Scope::Owner(stranger)).await.unwrap().is_none());
        assert!(store.find(t.id, Scope::Owner(owner)).await.unwrap().is_some());
        assert!(store.find(t.id, Scope::Public).await.unwrap().is_some());

        let changes = TaskChanges {
            completed: Some(true),
            ..Default::default()
        };
        assert!(store
            .update(t.id, Scope::Owner(stranger), changes.clone())
            .await
            .unwrap()
            .is_none());
        assert!(store.delete(t.id, Scope::Owner(stranger)).await.unwrap().is_none());

        let updated = store.update(t.id, Scope::Owner(owner), changes).await.unwrap();
        assert!(updated.unwrap().completed);
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        for title in ["first", "second", "third"] {
            store.insert(task(owner, title)).await.unwrap();
        }
        store.insert(task(Uuid::new_v4(), "other")).await.unwrap();

        let titles: Vec<String> = store
            .list(&TaskFilter::default().scoped(Scope::Owner(owner)))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_task() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let t = store.insert(task(owner, "doomed")).await.unwrap();

        let removed = store.delete(t.id, Scope::Public).await.unwrap();
        assert_eq!(removed.map(|r| r.id), Some(t.id));
        assert!(store.find(t.id, Scope::Public).await.unwrap().is_none());
    }
}

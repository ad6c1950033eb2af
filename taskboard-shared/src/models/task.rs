/// Task model and database operations
///
/// A task is owned by exactly one user. Ownership is fixed at creation; every
/// read, update and delete is resolved through a [`Scope`] so that a task
/// owned by someone else looks exactly like a task that does not exist.
///
/// # Lifecycle
///
/// ```text
/// created → (updated)* → deleted
/// ```
///
/// `completed` is a flag toggled through updates, not a lifecycle state.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     user_id UUID NOT NULL REFERENCES users(id)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::user::OwnerSummary;

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,

    /// Applied when a task is created without a priority
    #[default]
    Medium,

    High,
}

impl Priority {
    /// Every accepted priority, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parses the exact lowercase wire name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// Which tasks an operation may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only tasks owned by this user
    Owner(Uuid),

    /// Any task, regardless of owner (public mode)
    Public,
}

impl Scope {
    /// Checks whether a task is visible under this scope
    pub fn permits(&self, task: &Task) -> bool {
        match self {
            Scope::Owner(user_id) => task.user_id == *user_id,
            Scope::Public => true,
        }
    }

    pub fn owner(&self) -> Option<Uuid> {
        match self {
            Scope::Owner(user_id) => Some(*user_id),
            Scope::Public => None,
        }
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Non-blank, stored trimmed
    pub title: String,

    /// Stored trimmed, empty when not supplied
    pub description: String,

    pub completed: bool,

    pub priority: Priority,

    /// Serialized as `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    /// Owner; immutable after creation
    pub user_id: Uuid,
}

/// Validated input for creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Validated partial update
///
/// `None` leaves a field untouched. `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskChanges {
    /// True when the update would not modify anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Exact-match list filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    /// Restrict to one owner; `None` lists across owners
    pub owner: Option<Uuid>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    /// Returns the same filters restricted to the scope's owner
    pub fn scoped(self, scope: Scope) -> Self {
        Self {
            owner: scope.owner(),
            ..self
        }
    }

    /// Checks a task against every set predicate
    pub fn matches(&self, task: &Task) -> bool {
        self.owner.map_or(true, |owner| task.user_id == owner)
            && self.completed.map_or(true, |c| task.completed == c)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.due_date.map_or(true, |d| task.due_date == Some(d))
    }
}

/// Task as returned by public endpoints, with its owner's name attached
#[derive(Debug, Clone, Serialize)]
pub struct PublicTask {
    #[serde(flatten)]
    pub task: Task,

    pub owner: Option<OwnerSummary>,
}

const TASK_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, created_at, user_id";

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, id: Uuid, scope: Scope) {
    query.push(" WHERE id = ").push_bind(id);
    if let Some(owner) = scope.owner() {
        query.push(" AND user_id = ").push_bind(owner);
    }
}

impl Task {
    /// Builds a fresh task for `owner` with a new ID and creation timestamp
    pub fn new(owner: Uuid, data: NewTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            completed: data.completed,
            priority: data.priority,
            due_date: data.due_date,
            created_at: Utc::now(),
            user_id: owner,
        }
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
    }

    /// Inserts a task
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database connection fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskboard_shared::models::task::{Task, NewTask, Priority};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
    /// let task = Task::new(owner, NewTask {
    ///     title: "Write report".to_string(),
    ///     description: String::new(),
    ///     completed: false,
    ///     priority: Priority::High,
    ///     due_date: None,
    /// });
    /// let stored = Task::create(&pool, &task).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, task: &Task) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (id, title, description, completed, priority, due_date, created_at, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, completed, priority, due_date, created_at, user_id
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within a scope
    pub async fn find(pool: &PgPool, id: Uuid, scope: Scope) -> Result<Option<Self>, sqlx::Error> {
        let mut query = QueryBuilder::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        push_scope(&mut query, id, scope);

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Lists tasks matching a filter, oldest first
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::new(format!("SELECT {} FROM tasks WHERE TRUE", TASK_COLUMNS));

        if let Some(owner) = filter.owner {
            query.push(" AND user_id = ").push_bind(owner);
        }
        if let Some(completed) = filter.completed {
            query.push(" AND completed = ").push_bind(completed);
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority);
        }
        if let Some(due_date) = filter.due_date {
            query.push(" AND due_date = ").push_bind(due_date);
        }
        query.push(" ORDER BY created_at ASC, id ASC");

        query.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Applies a partial update to a task within a scope
    ///
    /// Returns `None` if no task with that ID is visible under the scope.
    /// An empty change set reads the task back unchanged.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        scope: Scope,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        if changes.is_empty() {
            return Self::find(pool, id, scope).await;
        }

        let mut query = QueryBuilder::new("UPDATE tasks SET ");
        let mut assignments = query.separated(", ");

        if let Some(title) = changes.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = changes.description {
            assignments.push("description = ").push_bind_unseparated(description);
        }
        if let Some(completed) = changes.completed {
            assignments.push("completed = ").push_bind_unseparated(completed);
        }
        if let Some(priority) = changes.priority {
            assignments.push("priority = ").push_bind_unseparated(priority);
        }
        if let Some(due_date) = changes.due_date {
            assignments.push("due_date = ").push_bind_unseparated(due_date);
        }

        push_scope(&mut query, id, scope);
        query.push(format!(" RETURNING {}", TASK_COLUMNS));

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Deletes a task within a scope, returning the removed record
    pub async fn delete(
        pool: &PgPool,
        id: Uuid,
        scope: Scope,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = QueryBuilder::new("DELETE FROM tasks");
        push_scope(&mut query, id, scope);
        query.push(format!(" RETURNING {}", TASK_COLUMNS));

        query.build_query_as::<Task>().fetch_optional(pool).await
    }
}

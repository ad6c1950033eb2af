/// Database models for Taskboard
///
/// # Models
///
/// - `user`: User accounts, public profile and owner summary views
/// - `task`: Tasks, partial updates, list filters and ownership scope

pub mod task;
pub mod user;

pub use task::{NewTask, Priority, PublicTask, Scope, Task, TaskChanges, TaskFilter};
pub use user::{OwnerSummary, User, UserProfile};

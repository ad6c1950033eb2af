/// Owner-scoped task endpoints
///
/// Every handler runs as the authenticated caller. A task owned by someone
/// else answers exactly like a missing one: `404 not_found`.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{parse_id, ApiJson, ApiQuery},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use taskboard_shared::auth::authorization::AuthContext;
use taskboard_shared::models::Task;
use taskboard_shared::validation::{TaskPayload, TaskQuery};

/// Body returned by the delete endpoints
#[derive(Debug, Serialize)]
pub struct DeletedTask {
    pub message: String,

    pub task: Task,
}

impl From<Task> for DeletedTask {
    fn from(task: Task) -> Self {
        Self {
            message: "Task deleted".to_string(),
            task,
        }
    }
}

/// `GET /api/tasks?completed=&priority=&due_date=`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(&auth, query).await?))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    Ok(Json(state.tasks.get(&auth, id).await?))
}

/// `PUT /api/tasks/:id`; only the supplied fields change
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    Ok(Json(state.tasks.update(&auth, id, payload).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedTask>> {
    let id = parse_id(&id)?;
    let task = state.tasks.delete(&auth, id).await?;
    Ok(Json(task.into()))
}

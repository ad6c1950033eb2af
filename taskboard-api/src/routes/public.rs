/// Unauthenticated task endpoints
///
/// Reads and writes are not scoped to any owner. New tasks belong to the
/// default user, which is created on the first public write. Read and
/// update responses embed `owner: {id, username}`.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{parse_id, ApiJson, ApiQuery},
    routes::tasks::DeletedTask,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskboard_shared::models::{PublicTask, Task};
use taskboard_shared::validation::{TaskPayload, TaskQuery};

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> ApiResult<Json<Vec<PublicTask>>> {
    Ok(Json(state.tasks.list_public(query).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create_public(payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicTask>> {
    let id = parse_id(&id)?;
    Ok(Json(state.tasks.get_public(id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TaskPayload>,
) -> ApiResult<Json<PublicTask>> {
    let id = parse_id(&id)?;
    Ok(Json(state.tasks.update_public(id, payload).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedTask>> {
    let id = parse_id(&id)?;
    let task = state.tasks.delete_public(id).await?;
    Ok(Json(task.into()))
}

/// `GET /api/users/:id/tasks`
///
/// Callers may list only their own tasks; any other ID is `403 forbidden`.

use crate::{app::AppState, error::ApiResult, extract::parse_id};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskboard_shared::auth::authorization::AuthContext;
use taskboard_shared::models::Task;

pub async fn list_user_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let user_id = parse_id(&id)?;
    Ok(Json(state.tasks.list_for_user(&auth, user_id).await?))
}

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_db::models::TaskRow;
use zwarm_types::api::{Claims, CreateTaskRequest, TaskResponse, UpdateTaskRequest};
use zwarm_types::models::UserSummary;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_timestamp, parse_uuid};
use crate::validate::{self, Validator};

pub async fn create_task(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate::task_text(&mut v, &req.text);
    v.finish()?;

    let mid = mission_id.to_string();
    let mission = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    if mission.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the mission owner can add tasks."));
    }

    let task_id = Uuid::new_v4();
    state.db.insert_task(
        &task_id.to_string(),
        &mid,
        &claims.sub.to_string(),
        &req.text,
        req.emoji.as_deref(),
    )?;

    let creator_emoji = state.db.get_user_by_id(&claims.sub.to_string())?.and_then(|u| u.emoji);

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            id: task_id,
            text: req.text,
            emoji: req.emoji,
            is_completed: false,
            mission_id,
            creator: UserSummary {
                id: claims.sub,
                username: claims.username.clone(),
                emoji: creator_emoji,
            },
            created_at: chrono::Utc::now(),
        }),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path((mission_id, task_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(text) = &req.text {
        let mut v = Validator::new();
        validate::task_text(&mut v, text);
        v.finish()?;
    }

    let task = fetch_mission_task(&state, &mission_id, &task_id)?;
    authorize_owner_or_creator(&state, &task, &claims, "You do not have permission to update this task.")?;

    if req.text.is_none() && req.is_completed.is_none() {
        return Err(ApiError::BadRequest("No update data provided."));
    }

    state.db.update_task(&task.id, req.text.as_deref(), req.is_completed)?;

    let updated = state
        .db
        .get_task(&task.id)?
        .ok_or(ApiError::NotFound("Task not found or does not belong to this mission."))?;

    Ok(Json(task_response(updated)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((mission_id, task_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let task = fetch_mission_task(&state, &mission_id, &task_id)?;
    authorize_owner_or_creator(&state, &task, &claims, "You do not have permission to delete this task.")?;

    state.db.delete_task(&task.id)?;

    Ok(Json(serde_json::json!({ "message": "Task deleted successfully." })))
}

/// A task addressed through the wrong mission is reported as absent, never
/// acted on.
fn fetch_mission_task(state: &AppState, mission_id: &Uuid, task_id: &Uuid) -> Result<TaskRow, ApiError> {
    state
        .db
        .get_task(&task_id.to_string())?
        .filter(|task| task.mission_id == mission_id.to_string())
        .ok_or(ApiError::NotFound("Task not found or does not belong to this mission."))
}

fn authorize_owner_or_creator(
    state: &AppState,
    task: &TaskRow,
    claims: &Claims,
    denial: &'static str,
) -> Result<(), ApiError> {
    let mission = state
        .db
        .get_mission(&task.mission_id)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    let caller = claims.sub.to_string();
    let is_owner = mission.owner_id == caller;
    let is_creator = task.creator_id == caller;

    if !is_owner && !is_creator {
        return Err(ApiError::Forbidden(denial));
    }
    Ok(())
}

pub(crate) fn task_response(row: TaskRow) -> TaskResponse {
    TaskResponse {
        id: parse_uuid(&row.id, "task"),
        text: row.text,
        emoji: row.emoji,
        is_completed: row.is_completed,
        mission_id: parse_uuid(&row.mission_id, "task mission"),
        creator: UserSummary {
            id: parse_uuid(&row.creator_id, "task creator"),
            username: row.creator_username,
            emoji: row.creator_emoji,
        },
        created_at: parse_timestamp(&row.created_at, "task"),
    }
}

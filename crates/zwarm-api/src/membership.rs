use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Idempotent: a first join inserts the participant row (201), a repeat
/// join (including one that lost a race on the composite key) is a
/// no-op success (200).
pub async fn join_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = mission_id.to_string();
    if state.db.get_mission(&mid)?.is_none() {
        return Err(ApiError::NotFound("Mission not found."));
    }

    let joined = state.db.insert_participant(&mid, &claims.sub.to_string())?;

    let status = if joined { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(serde_json::json!({ "joined": joined }))))
}

pub async fn leave_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = mission_id.to_string();
    if state.db.get_mission(&mid)?.is_none() {
        return Err(ApiError::NotFound("Mission not found."));
    }

    let removed = state.db.delete_participant(&mid, &claims.sub.to_string())?;
    if !removed {
        return Err(ApiError::NotFound("You are not a participant of this mission."));
    }

    Ok(Json(serde_json::json!({ "message": "Successfully left mission." })))
}

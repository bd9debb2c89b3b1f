use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_db::models::ResourceRow;
use zwarm_types::api::{Claims, CreateResourceRequest, ResourceResponse};
use zwarm_types::models::UserSummary;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_timestamp, parse_uuid};
use crate::validate::{self, Validator};

pub async fn create_resource(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate::resource_fields(&mut v, &req.title, &req.url, req.description.as_deref());
    v.finish()?;

    let mid = mission_id.to_string();
    let mission = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    if mission.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the mission owner can add resources."));
    }

    let resource_id = Uuid::new_v4();
    state.db.insert_resource(
        &resource_id.to_string(),
        &mid,
        &claims.sub.to_string(),
        &req.title,
        &req.url,
        req.description.as_deref(),
        req.emoji.as_deref(),
    )?;

    let user_emoji = state.db.get_user_by_id(&claims.sub.to_string())?.and_then(|u| u.emoji);

    Ok((
        StatusCode::CREATED,
        Json(ResourceResponse {
            id: resource_id,
            title: req.title,
            url: req.url,
            description: req.description,
            emoji: req.emoji,
            mission_id,
            user: UserSummary {
                id: claims.sub,
                username: claims.username.clone(),
                emoji: user_emoji,
            },
            created_at: chrono::Utc::now(),
        }),
    ))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path((mission_id, resource_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = mission_id.to_string();
    let mission = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    let resource = state
        .db
        .get_resource(&resource_id.to_string())?
        .filter(|r| r.mission_id == mid)
        .ok_or(ApiError::NotFound("Resource not found or does not belong to this mission."))?;

    if mission.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the mission owner can delete resources."));
    }

    state.db.delete_resource(&resource.id)?;

    Ok(Json(serde_json::json!({ "message": "Resource deleted successfully." })))
}

pub(crate) fn resource_response(row: ResourceRow) -> ResourceResponse {
    ResourceResponse {
        id: parse_uuid(&row.id, "resource"),
        title: row.title,
        url: row.url,
        description: row.description,
        emoji: row.emoji,
        mission_id: parse_uuid(&row.mission_id, "resource mission"),
        user: UserSummary {
            id: parse_uuid(&row.user_id, "resource user"),
            username: row.username,
            emoji: row.user_emoji,
        },
        created_at: parse_timestamp(&row.created_at, "resource"),
    }
}

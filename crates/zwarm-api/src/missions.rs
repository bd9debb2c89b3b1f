use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_db::models::{CommentRow, MissionRow, MissionWithOwnerRow, ParticipantRow};
use zwarm_types::api::{
    Claims, CommentResponse, CreateMissionRequest, MissionDetailResponse, MissionListItem,
    MissionResponse, ParticipantResponse, UpdateMissionRequest,
};
use zwarm_types::models::{MissionStatus, UserSummary};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::claims_from_headers;
use crate::util::{parse_status, parse_string_array, parse_timestamp, parse_uuid};
use crate::validate::{self, Validator};
use crate::{resources, tasks};

pub async fn create_mission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate::mission_fields(&mut v, &req.title, &req.description, req.tags.as_deref());
    v.finish()?;

    let mission_id = Uuid::new_v4();
    let tags = req.tags.unwrap_or_default();
    let tags_json = serde_json::to_string(&tags).map_err(anyhow::Error::from)?;

    state.db.insert_mission(
        &mission_id.to_string(),
        &req.title,
        &req.description,
        req.emoji.as_deref(),
        &tags_json,
        &claims.sub.to_string(),
    )?;

    let now = chrono::Utc::now();
    Ok((
        StatusCode::CREATED,
        Json(MissionResponse {
            id: mission_id,
            title: req.title,
            description: req.description,
            emoji: req.emoji,
            tags,
            status: MissionStatus::Open,
            owner_id: claims.sub,
            created_at: now,
            updated_at: now,
        }),
    ))
}

pub async fn list_missions(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_missions())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let missions: Vec<MissionListItem> = rows.into_iter().map(mission_list_item).collect();
    Ok(Json(missions))
}

pub async fn get_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let claims = claims_from_headers(&headers);

    // Run the whole multi-query read off the async runtime
    let db = state.clone();
    let mid = mission_id.to_string();
    let detail = tokio::task::spawn_blocking(move || {
        let Some(mission) = db.db.get_mission_with_owner(&mid)? else {
            return Ok(None);
        };
        let participants = db.db.list_participants(&mid)?;
        let tasks = db.db.list_tasks(&mid)?;
        let comments = db.db.list_comments(&mid)?;
        let resources = db.db.list_resources(&mid)?;
        let participant_count = db.db.count_participants(&mid)?;
        Ok::<_, anyhow::Error>(Some((mission, participants, tasks, comments, resources, participant_count)))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let Some((mission, participants, tasks, comments, resources, participant_count)) = detail else {
        return Err(ApiError::NotFound("Mission not found."));
    };

    // The owner participates implicitly, without a stored row.
    let current_user_is_participant = claims
        .map(|c| {
            let caller = c.sub.to_string();
            mission.mission.owner_id == caller || participants.iter().any(|p| p.user_id == caller)
        })
        .unwrap_or(false);

    let MissionWithOwnerRow { mission: m, owner_username, owner_emoji } = mission;
    let owner = UserSummary {
        id: parse_uuid(&m.owner_id, "mission owner"),
        username: owner_username,
        emoji: owner_emoji,
    };

    Ok(Json(MissionDetailResponse {
        id: parse_uuid(&m.id, "mission"),
        title: m.title,
        description: m.description,
        emoji: m.emoji,
        tags: parse_string_array(&m.tags, "mission tags"),
        status: parse_status(&m.status, "mission"),
        owner,
        participant_count,
        participants: participants.into_iter().map(participant_response).collect(),
        tasks: tasks.into_iter().map(tasks::task_response).collect(),
        comments: comments.into_iter().map(comment_response).collect(),
        resources: resources.into_iter().map(resources::resource_response).collect(),
        current_user_is_participant,
        created_at: parse_timestamp(&m.created_at, "mission"),
        updated_at: parse_timestamp(&m.updated_at, "mission"),
    }))
}

pub async fn update_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateMissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate::mission_fields(&mut v, &req.title, &req.description, req.tags.as_deref());
    v.finish()?;

    let mid = mission_id.to_string();
    let mission = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    if mission.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the mission owner can update it."));
    }

    let tags = req.tags.unwrap_or_default();
    let tags_json = serde_json::to_string(&tags).map_err(anyhow::Error::from)?;

    state.db.update_mission(
        &mid,
        &req.title,
        &req.description,
        req.emoji.as_deref(),
        &tags_json,
        req.status.map(|s| s.as_str()),
    )?;

    let updated = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    Ok(Json(mission_response(updated)))
}

pub async fn delete_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = mission_id.to_string();
    let mission = state
        .db
        .get_mission(&mid)?
        .ok_or(ApiError::NotFound("Mission not found."))?;

    if mission.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the mission owner can delete it."));
    }

    state.db.delete_mission(&mid)?;

    Ok(Json(serde_json::json!({ "message": "Mission deleted successfully." })))
}

fn mission_response(row: MissionRow) -> MissionResponse {
    MissionResponse {
        id: parse_uuid(&row.id, "mission"),
        title: row.title,
        description: row.description,
        emoji: row.emoji,
        tags: parse_string_array(&row.tags, "mission tags"),
        status: parse_status(&row.status, "mission"),
        owner_id: parse_uuid(&row.owner_id, "mission owner"),
        created_at: parse_timestamp(&row.created_at, "mission"),
        updated_at: parse_timestamp(&row.updated_at, "mission"),
    }
}

fn mission_list_item(row: MissionWithOwnerRow) -> MissionListItem {
    let MissionWithOwnerRow { mission: m, owner_username, owner_emoji } = row;
    MissionListItem {
        id: parse_uuid(&m.id, "mission"),
        title: m.title,
        description: m.description,
        emoji: m.emoji,
        tags: parse_string_array(&m.tags, "mission tags"),
        status: parse_status(&m.status, "mission"),
        owner: UserSummary {
            id: parse_uuid(&m.owner_id, "mission owner"),
            username: owner_username,
            emoji: owner_emoji,
        },
        created_at: parse_timestamp(&m.created_at, "mission"),
        updated_at: parse_timestamp(&m.updated_at, "mission"),
    }
}

fn participant_response(row: ParticipantRow) -> ParticipantResponse {
    ParticipantResponse {
        user: UserSummary {
            id: parse_uuid(&row.user_id, "participant"),
            username: row.username,
            emoji: row.user_emoji,
        },
        joined_at: parse_timestamp(&row.joined_at, "participant"),
    }
}

fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: parse_uuid(&row.id, "comment"),
        content: row.content,
        mission_id: parse_uuid(&row.mission_id, "comment mission"),
        user: UserSummary {
            id: parse_uuid(&row.user_id, "comment user"),
            username: row.username,
            emoji: row.user_emoji,
        },
        created_at: parse_timestamp(&row.created_at, "comment"),
    }
}


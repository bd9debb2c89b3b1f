use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_db::models::{MissionCardRow, UserRow};
use zwarm_types::api::{
    Claims, MissionCard, PublicUser, SettingsResponse, UpdateSettingsRequest, UserProfileResponse,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_status, parse_string_array, parse_timestamp, parse_uuid};
use crate::validate::{self, Validator};

/// Public profile: user fields (email excluded) plus card summaries of the
/// missions they own and the missions they have joined.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = user_id.to_string();
    let profile = tokio::task::spawn_blocking(move || {
        let Some(user) = db.db.get_user_by_id(&uid)? else {
            return Ok(None);
        };
        let owned = db.db.list_owned_mission_cards(&uid)?;
        let joined = db.db.list_joined_mission_cards(&uid)?;
        Ok::<_, anyhow::Error>(Some((user, owned, joined)))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let Some((user, owned, joined)) = profile else {
        return Err(ApiError::NotFound("User not found."));
    };

    Ok(Json(UserProfileResponse {
        user: public_user(user),
        owned_missions: owned.into_iter().map(mission_card).collect(),
        joined_missions: joined.into_iter().map(mission_card).collect(),
    }))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_none() && req.emoji.is_none() && req.bio.is_none() && req.skills.is_none() {
        return Err(ApiError::BadRequest("No update data provided."));
    }

    let mut v = Validator::new();
    validate::settings_fields(&mut v, req.username.as_deref(), req.bio.as_deref(), req.skills.as_deref());
    v.finish()?;

    let caller = claims.sub.to_string();

    // Uniqueness against other users; the column constraint backstops races.
    if let Some(username) = &req.username {
        if let Some(existing) = state.db.get_user_by_username(username)? {
            if existing.id != caller {
                return Err(ApiError::Conflict("Username is already taken."));
            }
        }
    }

    let skills_json = match &req.skills {
        Some(skills) => Some(serde_json::to_string(skills).map_err(anyhow::Error::from)?),
        None => None,
    };

    state.db.update_user_settings(
        &caller,
        req.username.as_deref(),
        req.emoji.as_deref(),
        req.bio.as_deref(),
        skills_json.as_deref(),
    )?;

    let user = state
        .db
        .get_user_by_id(&caller)?
        .ok_or(ApiError::NotFound("User not found."))?;

    Ok(Json(SettingsResponse {
        id: claims.sub,
        username: user.username,
        emoji: user.emoji,
        bio: user.bio,
        skills: parse_string_array(&user.skills, "user skills"),
        updated_at: parse_timestamp(&user.updated_at, "user"),
    }))
}

pub async fn owned_missions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state.db.list_owned_mission_cards(&claims.sub.to_string())?;
    Ok(Json(cards.into_iter().map(mission_card).collect::<Vec<_>>()))
}

pub async fn joined_missions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state.db.list_joined_mission_cards(&claims.sub.to_string())?;
    Ok(Json(cards.into_iter().map(mission_card).collect::<Vec<_>>()))
}

fn public_user(row: UserRow) -> PublicUser {
    PublicUser {
        id: parse_uuid(&row.id, "user"),
        username: row.username,
        emoji: row.emoji,
        bio: row.bio,
        skills: parse_string_array(&row.skills, "user skills"),
        created_at: parse_timestamp(&row.created_at, "user"),
    }
}

fn mission_card(row: MissionCardRow) -> MissionCard {
    MissionCard {
        id: parse_uuid(&row.id, "mission"),
        title: row.title,
        description: row.description,
        emoji: row.emoji,
        tags: parse_string_array(&row.tags, "mission tags"),
        status: parse_status(&row.status, "mission"),
        contributors: row.participant_count,
        created_at: parse_timestamp(&row.created_at, "mission"),
    }
}

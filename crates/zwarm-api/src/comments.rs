use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use zwarm_types::api::{Claims, CommentResponse, CreateCommentRequest};
use zwarm_types::models::UserSummary;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::validate::{self, Validator};

/// Comments are open to any authenticated user, member or not, and are
/// append-only: there is no update or delete path.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(mission_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate::comment_content(&mut v, &req.content);
    v.finish()?;

    let mid = mission_id.to_string();
    if state.db.get_mission(&mid)?.is_none() {
        return Err(ApiError::NotFound("Mission not found."));
    }

    let comment_id = Uuid::new_v4();
    state
        .db
        .insert_comment(&comment_id.to_string(), &mid, &claims.sub.to_string(), &req.content)?;

    let user_emoji = state.db.get_user_by_id(&claims.sub.to_string())?.and_then(|u| u.emoji);

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment_id,
            content: req.content,
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

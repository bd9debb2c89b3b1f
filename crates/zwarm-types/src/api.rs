use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MissionStatus, UserSummary};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// Canonical definition lives here in zwarm-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Missions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMissionRequest {
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMissionRequest {
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<MissionStatus>,
}

#[derive(Debug, Serialize)]
pub struct MissionResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Vec<String>,
    pub status: MissionStatus,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mission as returned by the list endpoint, with its owner resolved.
#[derive(Debug, Serialize)]
pub struct MissionListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Vec<String>,
    pub status: MissionStatus,
    pub owner: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full mission detail: owner, participants, tasks, comments, resources,
/// and whether the requesting user participates (the owner always does).
#[derive(Debug, Serialize)]
pub struct MissionDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Vec<String>,
    pub status: MissionStatus,
    pub owner: UserSummary,
    pub participant_count: u32,
    pub participants: Vec<ParticipantResponse>,
    pub tasks: Vec<TaskResponse>,
    pub comments: Vec<CommentResponse>,
    pub resources: Vec<ResourceResponse>,
    pub current_user_is_participant: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card-sized mission summary for profile and dashboard listings.
#[derive(Debug, Serialize)]
pub struct MissionCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub tags: Vec<String>,
    pub status: MissionStatus,
    pub contributors: u32,
    pub created_at: DateTime<Utc>,
}

// -- Membership --

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
}

// -- Tasks --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub text: String,
    pub emoji: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub text: String,
    pub emoji: Option<String>,
    pub is_completed: bool,
    pub mission_id: Uuid,
    pub creator: UserSummary,
    pub created_at: DateTime<Utc>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub mission_id: Uuid,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
}

// -- Resources --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateResourceRequest {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub mission_id: Uuid,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    pub username: Option<String>,
    pub emoji: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Public profile fields; email is deliberately excluded.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub emoji: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub id: Uuid,
    pub username: String,
    pub emoji: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub user: PublicUser,
    pub owned_missions: Vec<MissionCard>,
    pub joined_missions: Vec<MissionCard>,
}

pub mod auth;
pub mod comments;
pub mod error;
pub mod membership;
pub mod middleware;
pub mod missions;
pub mod resources;
pub mod tasks;
pub mod users;
pub mod validate;

mod util;

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Full route table. The binary layers CORS/tracing on top of this; the
/// integration tests drive it directly.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/missions", get(missions::list_missions))
        .route("/missions/{mission_id}", get(missions::get_mission))
        .route("/users/{user_id}", get(users::get_profile))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/missions", post(missions::create_mission))
        .route(
            "/missions/{mission_id}",
            put(missions::update_mission).delete(missions::delete_mission),
        )
        .route("/missions/{mission_id}/join", post(membership::join_mission))
        .route("/missions/{mission_id}/leave", post(membership::leave_mission))
        .route("/missions/{mission_id}/tasks", post(tasks::create_task))
        .route(
            "/missions/{mission_id}/tasks/{task_id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/missions/{mission_id}/comments", post(comments::create_comment))
        .route("/missions/{mission_id}/resources", post(resources::create_resource))
        .route(
            "/missions/{mission_id}/resources/{resource_id}",
            delete(resources::delete_resource),
        )
        .route("/users/me/owned-missions", get(users::owned_missions))
        .route("/users/me/joined-missions", get(users::joined_missions))
        .route("/users/me/settings", put(users::update_settings))
        .route_layer(from_fn(require_auth))
        .with_state(state);

    public.merge(protected)
}

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use zwarm_types::api::Claims;

use crate::error::ApiError;

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let claims = claims_from_headers(req.headers())
        .ok_or(ApiError::Unauthorized("Authentication required."))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Best-effort identity for public routes that personalize their payload
/// (e.g. the mission detail participation flag).
pub fn claims_from_headers(headers: &HeaderMap) -> Option<Claims> {
    let auth_header = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    let secret = std::env::var("ZWARM_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use graphpress_types::GraphId;
use graphpress_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the caller, placed in request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct Session {
    pub node_id: GraphId,
    pub username: String,
}

/// Validate the bearer token and attach a [`Session`]. Requests without one
/// are answered with `no-session` before any handler runs.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::NoSession)?;

    let claims = decode_token(&state.jwt_secret, bearer.token())?;

    req.extensions_mut().insert(Session {
        node_id: claims.sub,
        username: claims.username,
    });
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Rejected session token: {}", e);
        ApiError::NoSession
    })
}

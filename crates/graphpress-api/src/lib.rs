pub mod auth;
pub mod error;
pub mod messaging;
pub mod middleware;
pub mod state;

use axum::{
    Json, Router, middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

pub use state::{AppState, AppStateInner};

/// All routes. Messaging routes sit behind the session check; signup, login
/// and health are public.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/message", post(messaging::send_message))
        .route(
            "/fetchUnreadMessageCount",
            get(messaging::fetch_unread_message_count),
        )
        .route("/fetchInbox", get(messaging::fetch_inbox))
        .route("/fetchMessage", get(messaging::fetch_message))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::info;

use graphpress_types::GraphId;
use graphpress_types::api::{
    Claims, LoginRequest, LoginResponse, SignupRequest, SignupResponse, Success,
};

use crate::error::ApiError;
use crate::state::AppState;

const SESSION_DAYS: i64 = 30;

pub async fn signup(
    State(state): State<AppState>,
    req: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) =
        req.map_err(|_| ApiError::InvalidSignup("A username and password are required."))?;

    // Validate input
    if req.username.chars().count() < 3 || req.username.chars().count() > 32 {
        return Err(ApiError::InvalidSignup(
            "Username must be between 3 and 32 characters.",
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::InvalidSignup(
            "Password must be at least 8 characters.",
        ));
    }

    let user = state
        .with_store(move |store| {
            if store.user_by_username(&req.username)?.is_some() {
                return Err(ApiError::UsernameTaken);
            }

            // Hash password with Argon2id
            let salt = SaltString::generate(&mut OsRng);
            let password_hash = Argon2::default()
                .hash_password(req.password.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
                .to_string();

            // A concurrent signup can claim the name after the check above
            store
                .create_user(&req.username, &password_hash)?
                .ok_or(ApiError::UsernameTaken)
        })
        .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;
    info!("New user node {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(Success::new(SignupResponse {
            user_id: user.id,
            token,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = req.map_err(|_| ApiError::InvalidCredentials)?;

    let user = state
        .with_store(move |store| {
            let user = store
                .user_by_username(&req.username)?
                .ok_or(ApiError::InvalidCredentials)?;

            // Verify password
            let parsed_hash = PasswordHash::new(&user.password)
                .map_err(|e| anyhow::anyhow!("corrupt password hash for {}: {}", user.id, e))?;
            Argon2::default()
                .verify_password(req.password.as_bytes(), &parsed_hash)
                .map_err(|_| ApiError::InvalidCredentials)?;

            Ok(user)
        })
        .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok(Json(Success::new(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    })))
}

pub fn create_token(secret: &str, user_id: GraphId, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

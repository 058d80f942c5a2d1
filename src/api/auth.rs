//! Auth and account API endpoints
//!
//! First-run setup, login/logout and the owner's profile. Setup and login
//! are public; everything else sits behind the auth middleware.

use axum::{
    extract::State,
    http::header,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::ProfileUpdate;
use crate::models::User;
use crate::services::LoginInput;

/// Request body for first-run setup
#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Request body for profile updates
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for password changes
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Login response carrying the session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Build the public auth router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/setup", post(setup))
        .route("/login", post(login))
}

/// Build the authenticated auth router
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/password", put(update_password))
}

/// POST /api/v1/auth/setup - create the owner account (first run only)
async fn setup(
    State(state): State<AppState>,
    Json(request): Json<SetupRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .user_service
        .setup(&request.username, &request.password, request.nickname.as_deref())
        .await?;
    Ok(Json(user))
}

/// POST /api/v1/auth/login - verify credentials and issue a session token
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = state.user_service.login(&input).await?;
    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/v1/auth/logout - revoke the current session
async fn logout(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<Json<serde_json::Value>, ApiError> {
    // The middleware already validated the token; re-extract it to revoke it
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        state.user_service.logout(&token).await?;
    }
    Ok(Json(serde_json::json!({ "logged_out": true })))
}

/// GET /api/v1/auth/me - the authenticated owner's profile
async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<User> {
    Json(user.0)
}

/// PUT /api/v1/auth/profile - update profile fields
async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let update = ProfileUpdate {
        nickname: request.nickname,
        avatar: request.avatar,
        email: request.email,
        bio: request.bio,
    };
    let updated = state.user_service.update_profile(user.0.id, update).await?;
    Ok(Json(updated))
}

/// PUT /api/v1/auth/password - change the password
async fn update_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .user_service
        .update_password(user.0.id, &request.old_password, &request.new_password)
        .await?;
    Ok(Json(serde_json::json!({ "updated": true })))
}

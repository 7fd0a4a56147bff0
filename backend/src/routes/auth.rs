//! Authentication routes
//!
//! Register, login, identity lookup and logout. Password hashing runs on
//! the blocking thread pool inside the hasher.

use super::extract::ValidatedJson;
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mobile_auth_shared::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserResource};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// Register a new user
///
/// POST /api/register
async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth().register(&req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/login
async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state.auth().login(&req).await?;
    Ok(Json(response))
}

/// Current user
///
/// GET /api/me
///
/// # Authentication
/// Requires a valid Bearer token in the Authorization header.
async fn me(State(state): State<AppState>, session: AuthSession) -> Json<UserResource> {
    Json(state.auth().me(&session))
}

/// Revoke the presenting token
///
/// POST /api/logout
///
/// Succeeds with or without a valid token.
async fn logout(
    State(state): State<AppState>,
    session: Option<AuthSession>,
) -> Json<MessageResponse> {
    Json(state.auth().logout(session.as_ref()).await)
}

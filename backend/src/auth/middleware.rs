//! Bearer token authentication
//!
//! [`AuthSession`] is an extractor: handlers that take it only run for
//! requests carrying a live token. Handlers that take
//! `Option<AuthSession>` run either way.

use crate::error::ApiError;
use crate::repositories::User;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;
use uuid::Uuid;

/// The authenticated user and the token that authenticated the request
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token_id: Uuid,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;

        let record = app_state
            .tokens
            .resolve(token)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        // A token whose owner vanished is as good as revoked
        let user = app_state
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| {
                debug!(token_id = %record.id, "Token owner not found");
                ApiError::Unauthenticated
            })?;

        Ok(AuthSession {
            user,
            token_id: record.id,
        })
    }
}

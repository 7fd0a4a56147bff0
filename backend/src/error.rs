//! Application error handling
//!
//! Converts internal errors to HTTP responses. Every body carries a
//! `message`; validation failures add an `errors` map keyed by field.

use crate::repositories::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mobile_auth_shared::{AuthError, FieldErrors};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {}", .0.summary())]
    Validation(FieldErrors),

    /// Body was not JSON or had the wrong JSON types
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Registration hit an existing email after validation passed.
    /// Answered with 401 for compatibility with existing clients.
    #[error("{}", AuthError::EmailInUse)]
    EmailInUse,

    #[error("{}", AuthError::InvalidCredentials)]
    InvalidCredentials,

    #[error("{}", AuthError::Unauthenticated)]
    Unauthenticated,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // The store constraint is the authoritative uniqueness signal
            StoreError::DuplicateEmail => ApiError::EmailInUse,
            other => ApiError::Database(other),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::MalformedBody(_)
            | ApiError::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmailInUse | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                message: errors.summary(),
                errors: Some(errors),
            },
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                ErrorResponse {
                    message: "Server Error".to_string(),
                    errors: None,
                }
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                ErrorResponse {
                    message: "Server Error".to_string(),
                    errors: None,
                }
            }
            other => ErrorResponse {
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_shape() {
        let errors = FieldErrors::single("email", "The email field is required.");
        let (status, body) = body_json(ApiError::Validation(errors)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "The email field is required.");
        assert_eq!(body["errors"]["email"][0], "The email field is required.");
    }

    #[tokio::test]
    async fn test_invalid_credentials_shape() {
        let (status, body) = body_json(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Invalid credentials");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_email_in_use_is_unauthorized() {
        let (status, body) = body_json(ApiError::EmailInUse).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Email already in use, recover Password");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = body_json(ApiError::Internal(anyhow::anyhow!("db password leaked"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server Error");
    }

    #[test]
    fn test_duplicate_email_store_error_maps_to_email_in_use() {
        let error: ApiError = StoreError::DuplicateEmail.into();
        assert!(matches!(error, ApiError::EmailInUse));
    }

    #[rstest]
    #[case(ApiError::Validation(FieldErrors::new()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(ApiError::MalformedBody("eof".to_string()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(ApiError::InvalidCredentials, StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(ApiError::EmailInUse, StatusCode::UNAUTHORIZED)]
    #[case(ApiError::Unauthenticated, StatusCode::UNAUTHORIZED)]
    #[case(ApiError::Database(StoreError::Database(sqlx::Error::PoolTimedOut)), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_codes(#[case] error: ApiError, #[case] expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }
}

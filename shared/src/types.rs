//! Request and response types for the auth endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration request
///
/// Fields are optional so that a missing field is reported as a
/// validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public representation of a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResource {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Plaintext bearer token. Shown once, never re-derivable.
    pub token: String,
    pub user: UserResource,
}

/// Plain acknowledgement or error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.email.as_deref(), Some("a@b.co"));
        assert!(req.password.is_none());
    }

    #[test]
    fn test_non_string_field_is_rejected() {
        let result = serde_json::from_str::<LoginRequest>(r#"{"email":42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_response_shape() {
        let now = Utc::now();
        let response = AuthResponse {
            token: "abc".to_string(),
            user: UserResource {
                id: Uuid::nil(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                created_at: now,
                updated_at: now,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["token"], "abc");
        assert_eq!(value["user"]["email"], "ada@example.com");
        assert!(value["user"].get("password_hash").is_none());
    }
}

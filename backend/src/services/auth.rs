//! Registration, login, identity and logout flows
//!
//! The service borrows its collaborators from [`AppState`](crate::state::AppState)
//! and never touches HTTP types, so every flow can be exercised directly.

use crate::auth::{AuthSession, PasswordHasher, TokenIssuer};
use crate::error::ApiError;
use crate::repositories::{NewUser, User, UserStore};
use mobile_auth_shared::validation::{validate_login, validate_registration};
use mobile_auth_shared::{
    AuthResponse, FieldErrors, LoginRequest, MessageResponse, RegisterRequest, UserResource,
    ValidRegistration,
};
use tracing::{info, warn};

const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Auth flows over borrowed stores and capabilities
#[derive(Clone, Copy)]
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tokens: &'a dyn TokenIssuer,
    hasher: &'a dyn PasswordHasher,
}

impl<'a> AuthService<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        tokens: &'a dyn TokenIssuer,
        hasher: &'a dyn PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Create an account and issue its first token.
    ///
    /// Existing tokens for the email are never revoked here; the account is
    /// new, or creation fails.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let input = self.validate_registration(req).await?;

        // Re-checked even though validation covers it. Neither check is atomic
        // with the insert; the store's unique constraint has the final word.
        if self.users.email_exists(&input.email).await? {
            warn!("Registration raced with an existing account");
            return Err(ApiError::EmailInUse);
        }

        let password_hash = self.hasher.hash(input.password).await?;

        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;

        let token = self.tokens.issue(&user).await?;

        info!(user_id = %user.id, token_id = %token.record.id, "User registered");

        Ok(AuthResponse {
            token: token.plain_text,
            user: user.to_resource(),
        })
    }

    /// Local rules, then the uniqueness rule, reported together
    async fn validate_registration(
        &self,
        req: &RegisterRequest,
    ) -> Result<ValidRegistration, ApiError> {
        match validate_registration(req) {
            Ok(input) => {
                if self.users.email_exists(&input.email).await? {
                    return Err(ApiError::Validation(FieldErrors::single("email", EMAIL_TAKEN)));
                }
                Ok(input)
            }
            Err(mut errors) => {
                // A well-formed email is still checked so the client sees every problem
                if !errors.has("email") {
                    if let Some(email) = req.email.as_deref().map(str::trim) {
                        if self.users.email_exists(email).await? {
                            errors.add("email", EMAIL_TAKEN);
                        }
                    }
                }
                Err(ApiError::Validation(errors))
            }
        }
    }

    /// Exchange credentials for a token, revoking every earlier token.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let credentials = validate_login(req).map_err(ApiError::Validation)?;

        let user = self
            .verified_user(&credentials.email, credentials.password)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let revoked = self.tokens.revoke_all(user.id).await?;
        let token = self.tokens.issue(&user).await?;

        info!(
            user_id = %user.id,
            token_id = %token.record.id,
            revoked,
            "User logged in"
        );

        Ok(AuthResponse {
            token: token.plain_text,
            user: user.to_resource(),
        })
    }

    async fn verified_user(&self, email: &str, password: String) -> Result<Option<User>, ApiError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            // Unknown emails cost a hash verification too
            self.hasher.verify_dummy(password).await?;
            return Ok(None);
        };

        let valid = self
            .hasher
            .verify(password, user.password_hash.clone())
            .await?;

        Ok(valid.then_some(user))
    }

    /// Public representation of the authenticated user
    pub fn me(&self, session: &AuthSession) -> UserResource {
        session.user.to_resource()
    }

    /// Revoke the token that authenticated the request, if any.
    ///
    /// Always acknowledges. Other tokens of the same user are untouched.
    pub async fn logout(&self, session: Option<&AuthSession>) -> MessageResponse {
        if let Some(session) = session {
            match self.tokens.revoke(session.token_id).await {
                Ok(revoked) => {
                    info!(user_id = %session.user.id, token_id = %session.token_id, revoked, "User logged out")
                }
                Err(e) => warn!(token_id = %session.token_id, "Failed to revoke token: {}", e),
            }
        }

        MessageResponse::new("Logged out")
    }
}

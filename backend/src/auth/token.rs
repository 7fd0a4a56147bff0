//! Opaque bearer token issuance and revocation
//!
//! Tokens are random secrets handed to the client once, in the form
//! `{token_id}|{secret}`. Only the SHA-256 digest of the secret is stored,
//! so a leaked token table cannot be replayed.

use crate::repositories::{NewTokenRecord, StoreResult, TokenRecord, TokenStore, User};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Length of the random part of a token
pub const SECRET_LEN: usize = 40;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Freshly issued token. `plain_text` is never stored.
#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub record: TokenRecord,
    pub plain_text: String,
}

/// Token lifecycle capability
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Create a new token owned by `user`
    async fn issue(&self, user: &User) -> StoreResult<NewAccessToken>;

    /// Map a presented bearer string to a live token, if any
    async fn resolve(&self, bearer: &str) -> StoreResult<Option<TokenRecord>>;

    /// Delete one token. Returns whether it existed.
    async fn revoke(&self, token_id: Uuid) -> StoreResult<bool>;

    /// Delete every token owned by `user_id`. Returns how many were deleted.
    async fn revoke_all(&self, user_id: Uuid) -> StoreResult<u64>;
}

/// Stored personal access tokens
#[derive(Clone)]
pub struct PersonalAccessTokens {
    store: Arc<dyn TokenStore>,
    name: String,
    expiry: Option<Duration>,
}

impl PersonalAccessTokens {
    pub fn new(store: Arc<dyn TokenStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            expiry: None,
        }
    }

    /// Tokens stop resolving `secs` seconds after issue.
    ///
    /// A lifetime too large to represent means no expiry.
    pub fn with_expiry_secs(mut self, secs: Option<i64>) -> Self {
        self.expiry = secs.and_then(Duration::try_seconds);
        self
    }

    fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expiry.and_then(|ttl| issued_at.checked_add_signed(ttl))
    }
}

/// 40 uniformly distributed alphanumeric characters from the OS RNG
pub fn generate_secret() -> String {
    let mut secret = String::with_capacity(SECRET_LEN);
    let mut buf = [0u8; 64];
    // Rejection sampling: bytes >= 248 would bias the modulo
    let limit = CHARSET.len() * 4;

    while secret.len() < SECRET_LEN {
        OsRng.fill_bytes(&mut buf);
        for &byte in buf.iter().filter(|&&b| (b as usize) < limit) {
            if secret.len() == SECRET_LEN {
                break;
            }
            secret.push(CHARSET[byte as usize % CHARSET.len()] as char);
        }
    }
    secret
}

/// Hex SHA-256 digest of a token secret
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

#[async_trait]
impl TokenIssuer for PersonalAccessTokens {
    async fn issue(&self, user: &User) -> StoreResult<NewAccessToken> {
        let secret = generate_secret();
        let record = self
            .store
            .insert(NewTokenRecord {
                id: Uuid::new_v4(),
                user_id: user.id,
                name: self.name.clone(),
                token_hash: hash_secret(&secret),
                expires_at: self.expires_at(Utc::now()),
            })
            .await?;

        debug!(user_id = %user.id, token_id = %record.id, "Issued access token");

        let plain_text = format!("{}|{}", record.id, secret);
        Ok(NewAccessToken { record, plain_text })
    }

    async fn resolve(&self, bearer: &str) -> StoreResult<Option<TokenRecord>> {
        // Both `id|secret` and a bare secret are accepted
        let (record, secret) = match bearer.split_once('|') {
            Some((id, secret)) => match Uuid::parse_str(id) {
                Ok(id) => (self.store.find(id).await?, secret),
                Err(_) => return Ok(None),
            },
            None => (self.store.find_by_hash(&hash_secret(bearer)).await?, bearer),
        };

        let Some(record) = record else {
            return Ok(None);
        };

        if !digests_match(&record.token_hash, &hash_secret(secret)) {
            return Ok(None);
        }

        let now = Utc::now();
        if record.is_expired(now) {
            debug!(token_id = %record.id, "Rejected expired access token");
            return Ok(None);
        }

        self.store.touch(record.id, now).await?;
        Ok(Some(TokenRecord {
            last_used_at: Some(now),
            ..record
        }))
    }

    async fn revoke(&self, token_id: Uuid) -> StoreResult<bool> {
        self.store.delete(token_id).await
    }

    async fn revoke_all(&self, user_id: Uuid) -> StoreResult<u64> {
        self.store.delete_for_user(user_id).await
    }
}

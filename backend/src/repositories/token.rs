//! Personal access token repository

use super::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored token. Only the SHA-256 digest of the secret is kept.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub token_hash: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Input for inserting a token
#[derive(Debug, Clone)]
pub struct NewTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub token_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: NewTokenRecord) -> StoreResult<TokenRecord>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<TokenRecord>>;

    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>>;

    /// Record that the token authenticated a request
    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;

    /// Returns whether a token was deleted
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns the number of tokens deleted
    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64>;
}

/// PostgreSQL-backed token store
#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token: NewTokenRecord) -> StoreResult<TokenRecord> {
        let record = sqlx::query_as::<_, TokenRecord>(
            r#"
            INSERT INTO personal_access_tokens (id, user_id, name, token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, token_hash, last_used_at, expires_at, created_at
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.name)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<TokenRecord>> {
        let record = sqlx::query_as::<_, TokenRecord>(
            r#"
            SELECT id, user_id, name, token_hash, last_used_at, expires_at, created_at
            FROM personal_access_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>> {
        let record = sqlx::query_as::<_, TokenRecord>(
            r#"
            SELECT id, user_id, name, token_hash, last_used_at, expires_at, created_at
            FROM personal_access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE personal_access_tokens SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> TokenRecord {
        TokenRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "mobile".to_string(),
            token_hash: "0".repeat(64),
            last_used_at: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        assert!(!record(None).is_expired(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_token_expires_at_deadline() {
        let now = Utc::now();
        let token = record(Some(now));
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - Duration::seconds(1)));
    }
}

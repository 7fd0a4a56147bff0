//! In-process stores
//!
//! Same contracts as the PostgreSQL stores, held in maps behind
//! `tokio::sync::RwLock`. Used by tests and by `database.url = "memory://"`.

use super::token::{NewTokenRecord, TokenRecord, TokenStore};
use super::user::{NewUser, User, UserStore};
use super::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        // Checked under the write lock, so this is the authoritative constraint
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<Uuid, TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tokens owned by `user_id`
    pub async fn count_for_user(&self, user_id: Uuid) -> usize {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, token: NewTokenRecord) -> StoreResult<TokenRecord> {
        let record = TokenRecord {
            id: token.id,
            user_id: token.user_id,
            name: token.name,
            token_hash: token.token_hash,
            last_used_at: None,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };
        self.tokens.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<TokenRecord>> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(token) = self.tokens.write().await.get_mut(&id) {
            token.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }
}

/// Reports an email as free on the first existence check and taken on
/// every later one, like an account created between the two checks of a
/// registration.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct LateDuplicateUserStore {
    pub inner: MemoryUserStore,
    pub checks: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
#[async_trait]
impl UserStore for LateDuplicateUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        self.inner.create(user).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn email_exists(&self, _email: &str) -> StoreResult<bool> {
        let previous = self
            .checks
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(previous > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

//! Password hashing
//!
//! Argon2id is the default; bcrypt is available for stores migrated from
//! systems that used it.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive, so every call runs on
//! the blocking thread pool via `spawn_blocking`.

use anyhow::Result;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Hashed on first use to give unknown accounts something to verify against
const DUMMY_PASSWORD: &str = "mobile-auth-dummy-password";

/// One-way hash and verify capability
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: String) -> Result<String>;

    /// A stored hash this hasher cannot parse verifies as `false`
    async fn verify(&self, password: String, hash: String) -> Result<bool>;

    /// Same work as [`verify`](Self::verify), against a hash that belongs to
    /// no account. Used when the login email is unknown.
    async fn verify_dummy(&self, password: String) -> Result<()>;
}

fn join_error(e: tokio::task::JoinError) -> anyhow::Error {
    anyhow::anyhow!("Task join error: {}", e)
}

/// Argon2id hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Hash a password (blocking operation)
    pub fn hash_blocking(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a hash (blocking operation)
    pub fn verify_blocking(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash_blocking(&password))
            .await
            .map_err(join_error)?
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify_blocking(&password, &hash))
            .await
            .map_err(join_error)
    }

    async fn verify_dummy(&self, password: String) -> Result<()> {
        static DUMMY_HASH: OnceCell<String> = OnceCell::new();

        tokio::task::spawn_blocking(move || {
            let hash = DUMMY_HASH.get_or_try_init(|| Self::hash_blocking(DUMMY_PASSWORD))?;
            Self::verify_blocking(&password, hash);
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(join_error)?
    }
}

/// bcrypt hasher with a configurable cost
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, password: String) -> Result<String> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(join_error)?
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(join_error)
    }

    async fn verify_dummy(&self, password: String) -> Result<()> {
        let cost = self.cost;
        let dummy_hash = Arc::clone(&self.dummy_hash);

        tokio::task::spawn_blocking(move || {
            // Hashed at the configured cost so the verify takes as long as a real one
            let hash = dummy_hash
                .get_or_try_init(|| bcrypt::hash(DUMMY_PASSWORD, cost))
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
            let _ = bcrypt::verify(password, hash);
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(join_error)?
    }
}

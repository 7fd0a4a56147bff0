//! Credential and token persistence
//!
//! Stores are exposed as traits so the auth flow can run against
//! PostgreSQL in production and in-process maps in tests.

pub mod memory;
pub mod token;
pub mod user;

pub use memory::{MemoryTokenStore, MemoryUserStore};
pub use token::{NewTokenRecord, PgTokenStore, TokenRecord, TokenStore};
pub use user::{NewUser, PgUserStore, User, UserStore};

use thiserror::Error;

/// Persistence failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// The unique constraint on `users.email` rejected an insert
    #[error("email already exists")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

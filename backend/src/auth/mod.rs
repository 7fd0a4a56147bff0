//! Authentication module
//!
//! Password hashing, opaque bearer tokens and the request extractor that
//! resolves them.

mod middleware;
mod password;
mod token;

pub use middleware::{bearer_token, AuthSession};
pub use password::{Argon2Hasher, BcryptHasher, PasswordHasher};
pub use token::{generate_secret, hash_secret, NewAccessToken, PersonalAccessTokens, TokenIssuer};

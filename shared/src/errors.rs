//! Error types for the Mobile Auth API

use thiserror::Error;

/// Authentication failures surfaced to clients.
///
/// The display strings are the exact `message` values sent over the wire.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use, recover Password")]
    EmailInUse,

    /// Missing, malformed, revoked or expired bearer token
    #[error("Unauthenticated.")]
    Unauthenticated,
}

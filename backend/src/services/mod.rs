//! Business logic services
//!
//! Services coordinate the stores and auth capabilities; routes only
//! translate between HTTP and these calls.

pub mod auth;

pub use auth::AuthService;

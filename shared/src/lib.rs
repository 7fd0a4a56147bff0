//! Mobile Auth Shared Library
//!
//! Wire types, error taxonomy and input validation shared between the
//! backend and any Rust client of the API.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
pub use validation::{FieldErrors, ValidCredentials, ValidRegistration};

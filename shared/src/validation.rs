//! Input validation for the auth endpoints
//!
//! Validators return human readable messages per field, collected in a
//! [`FieldErrors`] map that is serialised as the `errors` object of a 422
//! response. Email format checks use the `validator` crate.

use crate::types::{LoginRequest, RegisterRequest};
use serde::ser::{Serialize, SerializeMap, Serializer};
use validator::ValidateEmail;

/// Maximum length of `name` and `email`, in characters
pub const MAX_STRING_LEN: usize = 255;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Field name -> list of messages, in the order fields were first reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single failing field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.0.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Total number of messages across all fields
    pub fn count(&self) -> usize {
        self.0.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// One-line summary: the first message, plus how many others exist.
    pub fn summary(&self) -> String {
        let first = self
            .0
            .iter()
            .flat_map(|(_, messages)| messages)
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());

        match self.count().saturating_sub(1) {
            0 => first,
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, messages) in &self.0 {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Registration input that passed every local rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input that passed every local rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCredentials {
    pub email: String,
    pub password: String,
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", field)
}

/// Normalise an optional string input.
///
/// Surrounding whitespace is trimmed when `trim` is set; an empty result
/// counts as absent.
fn present(value: Option<&str>, trim: bool) -> Option<String> {
    let value = value?;
    let value = if trim { value.trim() } else { value };
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Validate a display name: at most 255 characters
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.chars().count() > MAX_STRING_LEN {
        return Err(format!(
            "The name field must not be greater than {} characters.",
            MAX_STRING_LEN
        ));
    }
    Ok(())
}

/// Validate email format and length
///
/// Returns every failing rule, not just the first.
pub fn validate_email(email: &str) -> Result<(), Vec<String>> {
    let mut messages = Vec::new();
    if !email.validate_email() {
        messages.push("The email field must be a valid email address.".to_string());
    }
    if email.chars().count() > MAX_STRING_LEN {
        messages.push(format!(
            "The email field must not be greater than {} characters.",
            MAX_STRING_LEN
        ));
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(messages)
    }
}

/// Validate password strength: at least 8 characters
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "The password field must be at least {} characters.",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

/// Apply the registration rules that need no storage access.
///
/// Email uniqueness is checked by the backend afterwards.
pub fn validate_registration(req: &RegisterRequest) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = present(req.name.as_deref(), true);
    match &name {
        None => errors.add("name", required_message("name")),
        Some(name) => {
            if let Err(msg) = validate_name(name) {
                errors.add("name", msg);
            }
        }
    }

    let email = present(req.email.as_deref(), true);
    match &email {
        None => errors.add("email", required_message("email")),
        Some(email) => {
            if let Err(messages) = validate_email(email) {
                for msg in messages {
                    errors.add("email", msg);
                }
            }
        }
    }

    // Passwords are never trimmed
    let password = present(req.password.as_deref(), false);
    match &password {
        None => errors.add("password", required_message("password")),
        Some(password) => {
            if let Err(msg) = validate_password(password) {
                errors.add("password", msg);
            }
        }
    }

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(ValidRegistration {
            name,
            email,
            password,
        }),
        _ => Err(errors),
    }
}

/// Apply the login rules: both fields required, email well-formed.
pub fn validate_login(req: &LoginRequest) -> Result<ValidCredentials, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = present(req.email.as_deref(), true);
    match &email {
        None => errors.add("email", required_message("email")),
        Some(email) => {
            if !email.as_str().validate_email() {
                errors.add("email", "The email field must be a valid email address.");
            }
        }
    }

    let password = present(req.password.as_deref(), false);
    if password.is_none() {
        errors.add("password", required_message("password"));
    }

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => {
            Ok(ValidCredentials { email, password })
        }
        _ => Err(errors),
    }
}

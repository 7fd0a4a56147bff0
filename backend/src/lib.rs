//! Mobile Auth Backend Library
//!
//! Registration, login and bearer-token sessions for a mobile client.
//! Exposed as a library for tests and embedding.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

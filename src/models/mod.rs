//! Collaborator models: configuration and the bearer-token accessor.

pub mod auth;
pub mod config;

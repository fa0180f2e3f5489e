//! # Chassis Plugin System Errors
//!
//! Defines error types specific to plugin alias resolution: malformed alias
//! map values, unresolvable targets, descriptor parse failures and
//! initialization errors. All of these are per-entry: the resolver reports
//! them as events and keeps processing the remaining entries.

use std::path::PathBuf;
use thiserror::Error;

use crate::event::error::EventSystemError;

#[derive(Debug, Error)]
pub enum PluginSystemError {
    #[error("Plugin map value must be a non-empty string")]
    InvalidAliasTarget,

    #[error("Cannot resolve plugin: {0}")]
    UnresolvedTarget(String),

    #[error("Plugin descriptor error for '{path}': {message}")]
    DescriptorError { path: PathBuf, message: String },

    #[error("Plugin initialization error for '{plugin}': {message}")]
    InitializationError { plugin: String, message: String },

    #[error("Plugin conflict: {message}")]
    ConflictError { message: String },

    #[error("Event system error: {0}")]
    Event(#[from] EventSystemError),
}

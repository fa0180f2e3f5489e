//! # Chassis Config System Errors
//!
//! Defines error types specific to the config merge engine: malformed call
//! options, unreadable config roots and fragment parse failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::event::error::EventSystemError;

#[derive(Debug, Error)]
pub enum ConfigSystemError {
    /// Malformed call arguments; aborts the call immediately
    #[error("Invalid config options: {0}")]
    Validation(String),

    #[error("Failed to read config path '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config fragment '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Event system error: {0}")]
    Event(#[from] EventSystemError),
}

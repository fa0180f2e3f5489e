//! # Chassis Module System Errors
//!
//! Defines error types specific to module resolution and loading. Resolution
//! errors (missing or cyclical dependencies, invalid manifests) are
//! per-module: the offending module is dropped and reported via the event
//! bus while the pipeline continues.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::error::ConfigSystemError;
use crate::event::error::EventSystemError;
use crate::plugin_system::error::PluginSystemError;

#[derive(Debug, Error)]
pub enum ModuleSystemError {
    #[error("No name defined for module at: {}", .0.display())]
    NoModuleName(PathBuf),

    #[error("Module name must be a string at: {}", .0.display())]
    ModuleNameNotString(PathBuf),

    #[error("Invalid module name: {0}")]
    InvalidModuleName(String),

    #[error("Invalid module manifest at: {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    #[error("Missing module: {0}")]
    MissingDependency(String),

    #[error("Cyclical dependency found in {0}")]
    CyclicDependency(String),

    #[error("Unit load failed for '{unit}': {message}")]
    UnitLoad { unit: String, message: String },

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigSystemError),

    #[error("Plugin system error: {0}")]
    Plugin(#[from] PluginSystemError),

    #[error("Event system error: {0}")]
    Event(#[from] EventSystemError),
}

//! # Chassis Kernel Errors
//!
//! Crate-level error type aggregating the subsystem errors. Subsystem code
//! keeps its own error enums; this type exists so bootstrap entry points can
//! return one `Result` regardless of which stage failed.

use thiserror::Error;

use crate::config::error::ConfigSystemError;
use crate::event::error::EventSystemError;
use crate::module_system::error::ModuleSystemError;
use crate::plugin_system::error::PluginSystemError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Event system error: {0}")]
    Event(#[from] EventSystemError),

    #[error("Config system error: {0}")]
    Config(#[from] ConfigSystemError),

    #[error("Plugin system error: {0}")]
    Plugin(#[from] PluginSystemError),

    #[error("Module system error: {0}")]
    Module(#[from] ModuleSystemError),

    #[error("Bootstrap error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

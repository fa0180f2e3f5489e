//! # Chassis Kernel
//!
//! The bootstrap coordinator tying the subsystems together: configuration
//! merging, plugin resolution and module loading run as ordered phases over
//! one shared event bus.

pub mod bootstrap;
pub mod error;

pub use bootstrap::{BootReport, Bootstrap};
pub use error::{Error, Result};

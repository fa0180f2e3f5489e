//! # Chassis Plugin System
//!
//! Resolves operator-supplied plugin alias maps against a base path and an
//! installed-plugin table, producing a name-to-instance [`PluginRegistry`].
//!
//! Resolution is descriptor-driven: a target identifier is first looked up
//! as a local plugin unit relative to the base path (dotted names map to
//! nested subdirectories), then as an externally installed plugin registered
//! by the host. There is no runtime path-string binding; everything goes
//! through the typed resolution step in [`resolver`].
//!
//! ## Key Submodules:
//!
//! - **[`traits`]**: the async [`Plugin`] interface, the [`PluginContext`]
//!   handed to initializers, and the default file-backed
//!   [`DescriptorPlugin`](traits::DescriptorPlugin).
//! - **[`registry`]**: the insertion-ordered public-name registry.
//! - **[`resolver`]**: alias map processing, uniqueness enforcement and
//!   conflict reporting.
//! - **[`error`]**: plugin system error types.

pub mod error;
pub mod registry;
pub mod resolver;
pub mod traits;

pub use error::PluginSystemError;
pub use registry::{PluginHandle, PluginRegistry, PluginSource};
pub use resolver::{AliasMap, AliasTarget, PluginResolver};
pub use traits::{Plugin, PluginContext};

#[cfg(test)]
mod tests;

//! # Chassis Module System
//!
//! Discovers candidate modules on disk, builds a dependency graph from each
//! module's declared manifest, detects cycles and unresolved dependencies,
//! computes a deterministic load order and loads each module's config,
//! plugins, controllers, services and models in that order.
//!
//! ## Key Submodules:
//!
//! - **[`manifest`]**: the declarative [`ModuleManifest`] descriptor and its
//!   validation rules.
//! - **[`graph`]**: the depends-on graph, cycle detection and topological
//!   ordering.
//! - **[`loader`]**: discovery of controller/service/model units and the
//!   typed [`UnitLoader`](loader::UnitLoader) seam they are loaded through.
//! - **[`resolver`]**: the per-module load pipeline and the ordered
//!   [`LoadedModules`](resolver::LoadedModules) result.
//! - **[`error`]**: module system error types.

pub mod error;
pub mod graph;
pub mod loader;
pub mod manifest;
pub mod resolver;

pub use error::ModuleSystemError;
pub use graph::{GraphIssue, ModuleGraph};
pub use loader::{DescriptorUnitLoader, UnitDescriptor, UnitHandle, UnitKind, UnitLoader};
pub use manifest::ModuleManifest;
pub use resolver::{LoadedModule, LoadedModules, ModuleResolver};

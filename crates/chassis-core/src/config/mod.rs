//! # Chassis Config Merge Engine
//!
//! Reads a directory tree of configuration fragments, deep-merges them into
//! one [`ConfigTree`] and applies environment-conditional activation.
//!
//! Fragments are keyed by their relative path: directory segments become
//! nested key-path segments and the file stem becomes the leaf key. Files
//! are processed in reverse lexicographic order, so alphabetically earlier
//! fragments (`index.*` sorts first) are merged last and win collisions.
//! Every collision is reported as a `config.load.conflict` event before the
//! new value overwrites the old one.
//!
//! Top-level `env-<code>` scopes survive only when the scope code and the
//! active environment name pass the compatibility test in [`env`]; inside an
//! activated scope the same test prunes keys recursively.

pub mod env;
pub mod error;
pub mod format;
pub mod loader;
pub mod tree;

pub use error::ConfigSystemError;
pub use format::ConfigFormat;
pub use loader::ConfigLoader;
pub use tree::{ConfigTree, KeyConflict};

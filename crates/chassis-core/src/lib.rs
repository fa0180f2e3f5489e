pub mod config;
pub mod event;
pub mod kernel;
pub mod module_system;
pub mod plugin_system;
pub mod utils;

// Re-export the types most applications touch directly.
pub use config::{ConfigLoader, ConfigTree};
pub use event::{BootstrapEvent, Event, EventBus, EventResult};
pub use kernel::{BootReport, Bootstrap, Error, Result};
pub use module_system::{LoadedModule, LoadedModules, ModuleManifest, ModuleResolver};
pub use plugin_system::{AliasMap, Plugin, PluginRegistry, PluginResolver};

use std::any::Any;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::tree::ConfigTree;
use crate::event::Event;
use crate::module_system::loader::UnitKind;
use crate::module_system::manifest::ModuleManifest;

/// Lifecycle events emitted by the bootstrap pipeline.
///
/// Every payload carries enough context (path, name, underlying error) for an
/// observer to render a human-readable line without re-deriving state.
#[derive(Debug, Clone)]
pub enum BootstrapEvent {
    /// Config loading has begun for a directory
    ConfigLoad { path: PathBuf },
    /// A fragment key collided with an already-merged value; the new value wins
    ConfigLoadConflict { key_path: String, previous: Value, next: Value },
    /// The config directory could not be read or a fragment failed to parse
    ConfigLoadError { path: PathBuf, error: String },
    /// The final merged tree, after environment activation
    ConfigLoaded { path: PathBuf, tree: ConfigTree },

    /// A plugin entry is being resolved
    PluginLoad { name: String },
    /// Two aliases resolved to the same canonical plugin name
    PluginLoadConflict { name: String, message: String },
    /// A plugin entry failed to resolve or initialize
    PluginLoadError { name: String, error: String },
    /// A plugin was resolved, initialized and registered
    PluginLoaded { name: String },
    /// The plugin base path does not exist
    PluginsNotFound { path: PathBuf },

    /// A module is starting its load pipeline
    ModuleLoad { name: String },
    /// A second module with the same name was discovered; the first wins
    ModuleLoadConflict { name: String, first: ModuleManifest, duplicate: ModuleManifest },
    /// A module was dropped during resolution or failed to load
    ModuleLoadError { path: Option<PathBuf>, message: String },
    /// A module's config, plugins and units are all loaded
    ModuleLoaded { name: String },

    /// A controller/service/model unit is being loaded
    UnitLoad { module: String, kind: UnitKind, name: String },
    /// A unit failed to initialize; it is excluded without aborting its module
    UnitLoadError { module: String, kind: UnitKind, name: String, error: String },
    /// A unit loaded successfully
    UnitLoadComplete { module: String, kind: UnitKind, name: String },
}

impl Event for BootstrapEvent {
    fn name(&self) -> &'static str {
        match self {
            BootstrapEvent::ConfigLoad { .. } => "config.load",
            BootstrapEvent::ConfigLoadConflict { .. } => "config.load.conflict",
            BootstrapEvent::ConfigLoadError { .. } => "config.load.error",
            BootstrapEvent::ConfigLoaded { .. } => "config.loaded",
            BootstrapEvent::PluginLoad { .. } => "plugin.load",
            BootstrapEvent::PluginLoadConflict { .. } => "plugin.load.conflict",
            BootstrapEvent::PluginLoadError { .. } => "plugin.load.error",
            BootstrapEvent::PluginLoaded { .. } => "plugin.loaded",
            BootstrapEvent::PluginsNotFound { .. } => "plugins.not_found",
            BootstrapEvent::ModuleLoad { .. } => "module.load",
            BootstrapEvent::ModuleLoadConflict { .. } => "module.load.conflict",
            BootstrapEvent::ModuleLoadError { .. } => "module.load.error",
            BootstrapEvent::ModuleLoaded { .. } => "module.loaded",
            BootstrapEvent::UnitLoad { kind, .. } => match kind {
                UnitKind::Controller => "controller.load",
                UnitKind::Service => "service.load",
                UnitKind::Model => "model.load",
            },
            BootstrapEvent::UnitLoadError { kind, .. } => match kind {
                UnitKind::Controller => "controller.load.error",
                UnitKind::Service => "service.load.error",
                UnitKind::Model => "model.load.error",
            },
            BootstrapEvent::UnitLoadComplete { kind, .. } => match kind {
                UnitKind::Controller => "controller.load.complete",
                UnitKind::Service => "service.load.complete",
                UnitKind::Model => "model.load.complete",
            },
        }
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::loader::ConfigLoader;
use crate::config::tree::ConfigTree;
use crate::event::EventBus;
use crate::kernel::error::Result;
use crate::module_system::loader::UnitLoader;
use crate::module_system::resolver::{LoadedModules, ModuleResolver};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::resolver::{self, AliasMap, PluginResolver};
use crate::plugin_system::traits::{PluginConstructor, PluginContext};

/// Everything a finished boot produced: the merged application config, the
/// application-level plugin registry and the loaded modules in order.
#[derive(Debug)]
pub struct BootReport {
    pub config: ConfigTree,
    pub plugins: PluginRegistry,
    pub modules: LoadedModules,
}

/// Application bootstrap coordinator.
///
/// Owns the event bus and the knobs shared by every phase (environment name,
/// installed plugins, unit loader). Phases can be run individually through
/// [`Bootstrap::load_config`], [`Bootstrap::resolve_plugins`] and
/// [`Bootstrap::resolve_modules`], or end to end through
/// [`Bootstrap::boot`], which runs configuration, then application plugins,
/// then modules. Unit-level failures surface as events and the pipeline
/// keeps going; only malformed arguments abort a call.
pub struct Bootstrap {
    events: EventBus,
    environment: Option<String>,
    plugin_resolver: PluginResolver,
    unit_loader: Option<Arc<dyn UnitLoader>>,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        let events = EventBus::new();
        Self {
            plugin_resolver: PluginResolver::new(events.clone()),
            environment: None,
            unit_loader: None,
            events,
        }
    }

    /// Use an existing bus, e.g. one that already has listeners attached.
    pub fn with_event_bus(events: EventBus) -> Self {
        Self {
            plugin_resolver: PluginResolver::new(events.clone()),
            environment: None,
            unit_loader: None,
            events,
        }
    }

    /// Environment name used for config scope activation, e.g. `"test"`.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Register an externally installed plugin constructor. Alias targets
    /// that do not resolve locally fall back to this table.
    pub fn install_plugin(
        mut self,
        name: impl Into<String>,
        constructor: PluginConstructor,
    ) -> Self {
        self.plugin_resolver.register_installed(name, constructor);
        self
    }

    /// Override the loader controllers, services and models go through.
    pub fn unit_loader(mut self, loader: Arc<dyn UnitLoader>) -> Self {
        self.unit_loader = Some(loader);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Merge the configuration fragments under `path` and activate the
    /// configured environment's scopes.
    pub async fn load_config(&self, path: &Path) -> Result<ConfigTree> {
        let loader = ConfigLoader::new(self.events.clone());
        Ok(loader.load(path, self.environment.as_deref()).await?)
    }

    /// Resolve an alias map against `base_path` into a plugin registry,
    /// carrying `config` as the plugin context.
    pub async fn resolve_plugins(
        &self,
        base_path: &Path,
        aliases: &AliasMap,
        config: &ConfigTree,
    ) -> Result<PluginRegistry> {
        let resolver = self.plugin_resolver.clone().with_context(PluginContext {
            environment: self.environment.clone(),
            config: config.clone(),
        });
        Ok(resolver.resolve(base_path, aliases).await?)
    }

    /// Discover, order and load the modules under `roots`.
    pub async fn resolve_modules(&self, roots: &[PathBuf]) -> Result<LoadedModules> {
        let mut resolver = ModuleResolver::new(self.events.clone())
            .with_environment(self.environment.clone())
            .with_plugin_resolver(self.plugin_resolver.clone());
        if let Some(loader) = &self.unit_loader {
            resolver = resolver.with_unit_loader(loader.clone());
        }
        Ok(resolver.resolve(roots).await?)
    }

    /// Run the full boot sequence rooted at an application directory:
    /// `<root>/conf` for global configuration, `<root>/plugins` for
    /// application plugins, `<root>/modules` for feature modules. Missing
    /// directories are treated as empty.
    pub async fn boot(&self, root: &Path) -> Result<BootReport> {
        let conf_dir = root.join("conf");
        let config = if conf_dir.is_dir() {
            self.load_config(&conf_dir).await?
        } else {
            ConfigTree::new()
        };

        let plugins_dir = root.join("plugins");
        let aliases = config
            .get("plugins")
            .map(resolver::alias_map_from_value)
            .unwrap_or_default();
        let plugins = self.resolve_plugins(&plugins_dir, &aliases, &config).await?;

        let modules_dir = root.join("modules");
        let module_roots = if modules_dir.is_dir() {
            vec![modules_dir]
        } else {
            Vec::new()
        };
        let modules = self.resolve_modules(&module_roots).await?;

        log::info!(
            "boot complete: {} plugin(s), {} module(s)",
            plugins.len(),
            modules.len()
        );
        Ok(BootReport { config, plugins, modules })
    }
}

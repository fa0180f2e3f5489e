use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::loader::ConfigLoader;
use crate::config::tree::ConfigTree;
use crate::event::{BootstrapEvent, EventBus};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::graph::{GraphIssue, ModuleGraph};
use crate::module_system::loader::{
    self, DescriptorUnitLoader, UnitHandle, UnitKind, UnitLoader,
};
use crate::module_system::manifest::{MANIFEST_FILE, ModuleManifest};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::resolver::{self, PluginResolver};
use crate::plugin_system::traits::PluginContext;
use crate::utils::fs as fs_utils;

/// A fully loaded module. Created after its manifest passed validation and
/// all its dependencies were already loaded; lives until process exit.
#[derive(Debug)]
pub struct LoadedModule {
    pub manifest: ModuleManifest,
    pub config: ConfigTree,
    pub plugins: PluginRegistry,
    pub controllers: usize,
    pub services: BTreeMap<String, UnitHandle>,
    pub models: BTreeMap<String, UnitHandle>,
}

/// Name-to-module mapping that preserves load order.
#[derive(Debug, Default)]
pub struct LoadedModules {
    order: Vec<String>,
    modules: HashMap<String, LoadedModule>,
}

impl LoadedModules {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, module: LoadedModule) {
        self.order.push(module.manifest.name.clone());
        self.modules.insert(module.manifest.name.clone(), module);
    }

    pub fn get(&self, name: &str) -> Option<&LoadedModule> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Module names in load order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Modules in load order
    pub fn iter(&self) -> impl Iterator<Item = &LoadedModule> {
        self.order.iter().filter_map(|name| self.modules.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolves module root paths into an ordered set of loaded modules.
///
/// Discovery, graph validation and loading all report through the injected
/// event bus; per-module and per-unit failures never abort the pipeline,
/// which always completes with whatever subset loaded successfully.
#[derive(Clone)]
pub struct ModuleResolver {
    events: EventBus,
    environment: Option<String>,
    config_loader: ConfigLoader,
    plugin_resolver: PluginResolver,
    unit_loader: Arc<dyn UnitLoader>,
}

impl ModuleResolver {
    pub fn new(events: EventBus) -> Self {
        Self {
            config_loader: ConfigLoader::new(events.clone()),
            plugin_resolver: PluginResolver::new(events.clone()),
            unit_loader: Arc::new(DescriptorUnitLoader),
            environment: None,
            events,
        }
    }

    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the plugin resolver, e.g. to carry installed-plugin
    /// constructors into module plugin resolution.
    pub fn with_plugin_resolver(mut self, plugin_resolver: PluginResolver) -> Self {
        self.plugin_resolver = plugin_resolver;
        self
    }

    pub fn with_unit_loader(mut self, unit_loader: Arc<dyn UnitLoader>) -> Self {
        self.unit_loader = unit_loader;
        self
    }

    /// Discover, order and load every module under the given root paths.
    pub async fn resolve(&self, roots: &[PathBuf]) -> Result<LoadedModules, ModuleSystemError> {
        let graph = self.discover(roots).await?;
        let resolution = graph.resolve();

        for issue in &resolution.issues {
            let message = match issue {
                GraphIssue::MissingDependency { dependency, .. } => {
                    ModuleSystemError::MissingDependency(dependency.clone()).to_string()
                }
                GraphIssue::Cycle { detected_in, .. } => {
                    ModuleSystemError::CyclicDependency(detected_in.clone()).to_string()
                }
            };
            self.emit_module_error(None, &message).await?;
        }

        let mut loaded = LoadedModules::new();
        'modules: for manifest in &resolution.order {
            // A dependency dropped during resolution never made it into the
            // loaded map; its dependents cannot load either.
            for dependency in &manifest.dependencies {
                if !loaded.contains(dependency) {
                    let message =
                        ModuleSystemError::MissingDependency(dependency.clone()).to_string();
                    self.emit_module_error(Some(&manifest.path), &message).await?;
                    continue 'modules;
                }
            }

            self.events
                .emit(&BootstrapEvent::ModuleLoad { name: manifest.name.clone() })
                .await?;

            match self.load_module(manifest).await {
                Ok(module) => {
                    loaded.insert(module);
                    self.events
                        .emit(&BootstrapEvent::ModuleLoaded { name: manifest.name.clone() })
                        .await?;
                }
                Err(err) => {
                    self.emit_module_error(Some(&manifest.path), &err.to_string()).await?;
                }
            }
        }

        log::info!(
            "module resolution complete: {} of {} discovered module(s) loaded",
            loaded.len(),
            graph.len()
        );
        Ok(loaded)
    }

    /// Walk every root path for candidate module directories and build the
    /// dependency graph. The first module discovered under a name wins;
    /// later duplicates raise `module.load.conflict` and are ignored.
    async fn discover(&self, roots: &[PathBuf]) -> Result<ModuleGraph, ModuleSystemError> {
        let mut graph = ModuleGraph::new();

        for root in roots {
            let candidates = fs_utils::list_subdirectories(root).map_err(|source| {
                ModuleSystemError::Io {
                    path: root.clone(),
                    operation: "list module candidates".to_string(),
                    source,
                }
            })?;

            for candidate in candidates {
                match self.read_manifest(&candidate).await {
                    Ok(Some(manifest)) => {
                        if let Some(first) = graph.get(&manifest.name) {
                            self.events
                                .emit(&BootstrapEvent::ModuleLoadConflict {
                                    name: manifest.name.clone(),
                                    first: first.clone(),
                                    duplicate: manifest,
                                })
                                .await?;
                        } else {
                            graph.insert(manifest);
                        }
                    }
                    // Not every directory is a module.
                    Ok(None) => {}
                    Err(err) => {
                        self.emit_module_error(Some(&candidate), &err.to_string()).await?;
                    }
                }
            }
        }

        Ok(graph)
    }

    /// Read and validate one candidate's manifest. `None` means the
    /// directory carries no manifest and is silently skipped.
    async fn read_manifest(
        &self,
        module_path: &Path,
    ) -> Result<Option<ModuleManifest>, ModuleSystemError> {
        let manifest_path = module_path.join(MANIFEST_FILE);
        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ModuleSystemError::Io {
                    path: manifest_path,
                    operation: "read manifest".to_string(),
                    source,
                });
            }
        };

        let value: Value =
            serde_json::from_str(&content).map_err(|e| ModuleSystemError::ManifestParse {
                path: manifest_path.clone(),
                message: e.to_string(),
            })?;
        ModuleManifest::from_value(&value, module_path).map(Some)
    }

    /// Load one module's config, plugins and units. Per-unit failures are
    /// isolated; only config loading is fatal to the module itself.
    async fn load_module(&self, manifest: &ModuleManifest) -> Result<LoadedModule, ModuleSystemError> {
        let config = self.load_module_config(&manifest.path).await?;
        let plugins = self.load_module_plugins(manifest, &config).await?;

        let mut controllers = 0usize;
        let mut services = BTreeMap::new();
        let mut models = BTreeMap::new();

        for kind in UnitKind::ALL {
            let units = loader::discover_units(&manifest.name, &manifest.path, kind).map_err(
                |source| ModuleSystemError::Io {
                    path: manifest.path.join(kind.directory()),
                    operation: "discover units".to_string(),
                    source,
                },
            )?;

            for unit in units {
                self.events
                    .emit(&BootstrapEvent::UnitLoad {
                        module: manifest.name.clone(),
                        kind,
                        name: unit.name.clone(),
                    })
                    .await?;

                match self.unit_loader.load(&unit).await {
                    Ok(handle) => {
                        match kind {
                            UnitKind::Controller => controllers += 1,
                            UnitKind::Service => {
                                services.insert(handle.name.clone(), handle);
                            }
                            UnitKind::Model => {
                                models.insert(handle.name.clone(), handle);
                            }
                        }
                        self.events
                            .emit(&BootstrapEvent::UnitLoadComplete {
                                module: manifest.name.clone(),
                                kind,
                                name: unit.name.clone(),
                            })
                            .await?;
                    }
                    Err(err) => {
                        self.events
                            .emit(&BootstrapEvent::UnitLoadError {
                                module: manifest.name.clone(),
                                kind,
                                name: unit.name.clone(),
                                error: err.to_string(),
                            })
                            .await?;
                    }
                }
            }
        }

        Ok(LoadedModule {
            manifest: manifest.clone(),
            config,
            plugins,
            controllers,
            services,
            models,
        })
    }

    async fn load_module_config(&self, module_path: &Path) -> Result<ConfigTree, ModuleSystemError> {
        let conf_dir = module_path.join("conf");
        if !conf_dir.is_dir() {
            return Ok(ConfigTree::new());
        }
        Ok(self
            .config_loader
            .load(&conf_dir, self.environment.as_deref())
            .await?)
    }

    async fn load_module_plugins(
        &self,
        manifest: &ModuleManifest,
        config: &ConfigTree,
    ) -> Result<PluginRegistry, ModuleSystemError> {
        let plugins_dir = manifest.path.join("plugins");
        let alias_map = config.get("plugins").map(resolver::alias_map_from_value);

        let plugin_resolver = self.plugin_resolver.clone().with_context(PluginContext {
            environment: self.environment.clone(),
            config: config.clone(),
        });

        match alias_map {
            Some(map) => Ok(plugin_resolver.resolve(&plugins_dir, &map).await?),
            None if plugins_dir.is_dir() => Ok(plugin_resolver.discover(&plugins_dir).await?),
            None => Ok(PluginRegistry::new()),
        }
    }

    async fn emit_module_error(
        &self,
        path: Option<&Path>,
        message: &str,
    ) -> Result<(), ModuleSystemError> {
        self.events
            .emit(&BootstrapEvent::ModuleLoadError {
                path: path.map(Path::to_path_buf),
                message: message.to_string(),
            })
            .await?;
        Ok(())
    }
}

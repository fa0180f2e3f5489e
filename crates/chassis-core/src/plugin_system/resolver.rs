use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::event::{BootstrapEvent, EventBus};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::{PluginHandle, PluginRegistry, PluginSource};
use crate::plugin_system::traits::{DescriptorPlugin, Plugin, PluginConstructor, PluginContext};
use crate::utils::fs as fs_utils;

/// One alias map value: a target identifier, or `false` to explicitly
/// disable a built-in plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasTarget {
    /// Entry was `false`: the plugin is excluded from the registry
    Disabled,
    /// Target identifier to resolve
    Target(String),
    /// Anything that is neither `false` nor a string
    Invalid,
}

impl AliasTarget {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(false) => AliasTarget::Disabled,
            Value::String(s) => AliasTarget::Target(s.clone()),
            _ => AliasTarget::Invalid,
        }
    }
}

/// Operator-supplied mapping of public name to target identifier. A BTreeMap
/// keeps processing order deterministic and collapses duplicate aliases to
/// one entry.
pub type AliasMap = BTreeMap<String, AliasTarget>;

/// Build an [`AliasMap`] from a configuration value (the `plugins` key of a
/// merged tree). Non-object values yield an empty map.
pub fn alias_map_from_value(value: &Value) -> AliasMap {
    let mut map = AliasMap::new();
    if let Value::Object(entries) = value {
        for (alias, target) in entries {
            map.insert(alias.clone(), AliasTarget::from_value(target));
        }
    }
    map
}

/// Resolves plugin alias maps into a [`PluginRegistry`].
///
/// Targets resolve first as local plugin units relative to the base path
/// (dotted names map to nested subdirectories), then as externally installed
/// plugins registered with [`PluginResolver::register_installed`].
#[derive(Clone)]
pub struct PluginResolver {
    events: EventBus,
    context: PluginContext,
    installed: HashMap<String, PluginConstructor>,
}

impl PluginResolver {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            context: PluginContext::default(),
            installed: HashMap::new(),
        }
    }

    /// Replace the application context handed to plugin initializers.
    pub fn with_context(mut self, context: PluginContext) -> Self {
        self.context = context;
        self
    }

    /// Register an externally installed plugin constructor under its bare
    /// name. Targets that do not resolve locally fall back to this table.
    pub fn register_installed(&mut self, name: impl Into<String>, constructor: PluginConstructor) {
        self.installed.insert(name.into(), constructor);
    }

    /// Resolve every alias map entry against `base_path`.
    ///
    /// Individual entry failures emit `plugin.load.error` and never abort
    /// the remaining entries. A missing base path emits `plugins.not_found`
    /// and yields an empty registry.
    pub async fn resolve(
        &self,
        base_path: &Path,
        aliases: &AliasMap,
    ) -> Result<PluginRegistry, PluginSystemError> {
        let mut registry = PluginRegistry::new();

        if !base_path.exists() {
            self.events
                .emit(&BootstrapEvent::PluginsNotFound { path: base_path.to_path_buf() })
                .await?;
            return Ok(registry);
        }

        // Canonical target name -> public key of its first registry entry.
        // Used to detect two aliases yielding the same target name.
        let mut seen_targets: HashMap<String, String> = HashMap::new();

        for (alias, entry) in aliases {
            let target = match entry {
                AliasTarget::Disabled => {
                    log::debug!("plugin alias '{}' disabled by configuration", alias);
                    continue;
                }
                AliasTarget::Target(t) if !t.is_empty() => t,
                _ => {
                    let err = PluginSystemError::InvalidAliasTarget;
                    self.emit_plugin_error(alias, &err.to_string()).await?;
                    continue;
                }
            };

            self.events
                .emit(&BootstrapEvent::PluginLoad { name: target.clone() })
                .await?;

            let instance = match self.instantiate(base_path, target).await {
                Ok(instance) => instance,
                Err(err) => {
                    self.emit_plugin_error(target, &err.to_string()).await?;
                    continue;
                }
            };

            let handle = PluginHandle {
                alias: alias.clone(),
                target: target.clone(),
                source: instance.1,
                instance: instance.0,
            };

            let registered_name = match seen_targets.get(target) {
                None => {
                    // First occurrence registers under the canonical name.
                    registry.insert(target.clone(), handle);
                    seen_targets.insert(target.clone(), target.clone());
                    target.clone()
                }
                Some(existing_key) => {
                    // A different alias already produced this target name.
                    let err = PluginSystemError::ConflictError {
                        message: format!("Duplicate plugin alias: {target}"),
                    };
                    self.events
                        .emit(&BootstrapEvent::PluginLoadConflict {
                            name: target.clone(),
                            message: format!("Duplicate plugin alias: {target}"),
                        })
                        .await?;
                    log::warn!("{err}");

                    // Both entries remain registered, re-keyed under their
                    // distinct aliases.
                    if existing_key == target {
                        if let Some(first) = registry.remove(target) {
                            let first_alias = first.alias.clone();
                            seen_targets.insert(target.clone(), first_alias.clone());
                            registry.insert(first_alias, first);
                        }
                    }
                    registry.insert(alias.clone(), handle);
                    alias.clone()
                }
            };

            self.events
                .emit(&BootstrapEvent::PluginLoaded { name: registered_name })
                .await?;
        }

        Ok(registry)
    }

    /// Discover and register every plugin unit under `base_path` (flat or
    /// dot-namespaced) under its canonical name. Used for module `plugins/`
    /// folders without an alias map.
    pub async fn discover(&self, base_path: &Path) -> Result<PluginRegistry, PluginSystemError> {
        let mut registry = PluginRegistry::new();

        if !base_path.exists() {
            self.events
                .emit(&BootstrapEvent::PluginsNotFound { path: base_path.to_path_buf() })
                .await?;
            return Ok(registry);
        }

        let mut units: Vec<(String, PathBuf)> = fs_utils::find_files_with_extension(base_path, "json")
            .map_err(|e| PluginSystemError::DescriptorError {
                path: base_path.to_path_buf(),
                message: e.to_string(),
            })?
            .into_iter()
            .filter_map(|file| Some((canonical_name(base_path, &file)?, file)))
            .collect();
        units.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path) in units {
            self.events
                .emit(&BootstrapEvent::PluginLoad { name: name.clone() })
                .await?;

            let plugin = match self.load_descriptor(&name, &path).await {
                Ok(plugin) => plugin,
                Err(err) => {
                    self.emit_plugin_error(&name, &err.to_string()).await?;
                    continue;
                }
            };
            if let Err(err) = plugin.init(&self.context).await {
                self.emit_plugin_error(&name, &err.to_string()).await?;
                continue;
            }

            registry.insert(
                name.clone(),
                PluginHandle {
                    alias: name.clone(),
                    target: name.clone(),
                    source: PluginSource::Local(path),
                    instance: Arc::new(plugin),
                },
            );
            self.events
                .emit(&BootstrapEvent::PluginLoaded { name })
                .await?;
        }

        Ok(registry)
    }

    /// Resolve a target as a local unit, falling back to the installed
    /// table, then instantiate and initialize it.
    async fn instantiate(
        &self,
        base_path: &Path,
        target: &str,
    ) -> Result<(Arc<dyn Plugin>, PluginSource), PluginSystemError> {
        if let Some(path) = resolve_local(base_path, target) {
            let plugin = self.load_descriptor(target, &path).await?;
            plugin.init(&self.context).await?;
            return Ok((Arc::new(plugin), PluginSource::Local(path)));
        }

        if let Some(constructor) = self.installed.get(target) {
            let instance = constructor();
            instance.init(&self.context).await?;
            return Ok((instance, PluginSource::Installed));
        }

        Err(PluginSystemError::UnresolvedTarget(target.to_string()))
    }

    async fn load_descriptor(
        &self,
        name: &str,
        path: &Path,
    ) -> Result<DescriptorPlugin, PluginSystemError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            PluginSystemError::DescriptorError {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        let descriptor: Value =
            serde_json::from_str(&content).map_err(|e| PluginSystemError::DescriptorError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(DescriptorPlugin::new(name, path, Some(descriptor)))
    }

    async fn emit_plugin_error(&self, name: &str, error: &str) -> Result<(), PluginSystemError> {
        self.events
            .emit(&BootstrapEvent::PluginLoadError {
                name: name.to_string(),
                error: error.to_string(),
            })
            .await?;
        Ok(())
    }
}

/// Map a dotted target onto a local plugin unit: either
/// `<base>/<segments>.json` or `<base>/<segments>/plugin.json`.
fn resolve_local(base_path: &Path, target: &str) -> Option<PathBuf> {
    let mut dir = base_path.to_path_buf();
    for segment in target.split('.') {
        dir.push(segment);
    }

    let file = dir.with_extension("json");
    if file.is_file() {
        return Some(file);
    }
    let nested = dir.join("plugin.json");
    if nested.is_file() {
        return Some(nested);
    }
    None
}

/// Canonical dotted name of a discovered plugin unit: relative path with
/// separators replaced by dots, minus the extension. `plugin.json` inside a
/// subdirectory names the directory itself.
fn canonical_name(base_path: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(base_path).ok()?;
    let mut segments: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let stem = rel.file_stem()?.to_string_lossy().into_owned();
    if stem != "plugin" || segments.is_empty() {
        segments.push(stem);
    }
    Some(segments.join("."))
}

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::plugin_system::traits::Plugin;

/// Where a plugin's implementation was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginSource {
    /// A plugin unit relative to the resolver's base path
    Local(PathBuf),
    /// An externally installed plugin, looked up by bare name
    Installed,
}

/// A resolved, initialized plugin together with how it was reached.
#[derive(Clone)]
pub struct PluginHandle {
    /// The operator-supplied alias this entry came from
    pub alias: String,
    /// The canonical target identifier the alias pointed at
    pub target: String,
    pub source: PluginSource,
    pub instance: Arc<dyn Plugin>,
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("alias", &self.alias)
            .field("target", &self.target)
            .field("source", &self.source)
            .field("plugin", &self.instance.name())
            .finish()
    }
}

/// Mapping from public name to loaded plugin instance, in insertion order.
///
/// Invariant: at most one canonical identity per public name. Name conflicts
/// are the resolver's concern; the registry only stores what it is handed.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    entries: Vec<(String, PluginHandle)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert a handle under a public name, replacing any previous entry
    /// with the same name.
    pub fn insert(&mut self, name: impl Into<String>, handle: PluginHandle) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = handle;
        } else {
            self.entries.push((name, handle));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PluginHandle> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&PluginHandle> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, h)| h)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Public names, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginHandle)> {
        self.entries.iter().map(|(n, h)| (n.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

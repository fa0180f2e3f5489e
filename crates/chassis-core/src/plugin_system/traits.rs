use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::tree::ConfigTree;
use crate::plugin_system::error::PluginSystemError;

/// Application context handed to plugin initializers.
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    /// Active environment name, if any
    pub environment: Option<String>,
    /// Merged application configuration
    pub config: ConfigTree,
}

/// Core plugin interface.
///
/// A plugin is instantiated by the resolver and asynchronously initialized
/// with the application context before it is registered.
#[async_trait]
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Canonical name of this plugin
    fn name(&self) -> &str;

    /// Asynchronous initializer, run once before registration
    async fn init(&self, _context: &PluginContext) -> Result<(), PluginSystemError> {
        Ok(())
    }
}

/// Constructor for an externally installed plugin, registered by the host
/// under the plugin's bare name.
pub type PluginConstructor = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Default file-backed plugin produced from a discovered descriptor file.
#[derive(Debug, Clone)]
pub struct DescriptorPlugin {
    name: String,
    path: PathBuf,
    descriptor: Option<Value>,
}

impl DescriptorPlugin {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, descriptor: Option<Value>) -> Self {
        Self { name: name.into(), path: path.into(), descriptor }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn descriptor(&self) -> Option<&Value> {
        self.descriptor.as_ref()
    }
}

#[async_trait]
impl Plugin for DescriptorPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}

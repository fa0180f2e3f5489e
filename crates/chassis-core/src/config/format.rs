use std::path::Path;

use serde_json::Value;

use crate::config::error::ConfigSystemError;

/// Supported configuration fragment formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse fragment content into a JSON value, the common model every
    /// format is merged through.
    pub fn parse(&self, data: &str, path: &Path) -> Result<Value, ConfigSystemError> {
        match self {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| ConfigSystemError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| ConfigSystemError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                let table: toml::Table =
                    toml::from_str(data).map_err(|e| ConfigSystemError::Parse {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                serde_json::to_value(table).map_err(|e| ConfigSystemError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }
}

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::module_system::error::ModuleSystemError;

/// File name of the declarative module descriptor. A directory without one
/// is not a module.
pub const MANIFEST_FILE: &str = "module.json";

/// Declarative descriptor identifying a module's name, description and
/// dependencies. Read once per discovered module directory at resolution
/// time; immutable afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleManifest {
    pub name: String,
    pub description: String,
    /// Names of modules that must be loaded before this one
    pub dependencies: Vec<String>,
    /// Directory the module was discovered in
    pub path: PathBuf,
}

impl ModuleManifest {
    /// Build and validate a manifest from raw JSON.
    ///
    /// Parsing goes through `serde_json::Value` rather than a derive so the
    /// three validation failures keep their distinct messages: a missing
    /// name, a non-string name, and a name that fails the module-name
    /// pattern.
    pub fn from_value(value: &Value, module_path: &Path) -> Result<Self, ModuleSystemError> {
        let object = value.as_object().ok_or_else(|| ModuleSystemError::ManifestParse {
            path: module_path.to_path_buf(),
            message: "manifest must be a JSON object".to_string(),
        })?;

        let name_value = object
            .get("name")
            .ok_or_else(|| ModuleSystemError::NoModuleName(module_path.to_path_buf()))?;
        let name = name_value
            .as_str()
            .ok_or_else(|| ModuleSystemError::ModuleNameNotString(module_path.to_path_buf()))?;
        if !valid_module_name(name) {
            return Err(ModuleSystemError::InvalidModuleName(name.to_string()));
        }

        let description = object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let dependencies = object
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            description,
            dependencies,
            path: module_path.to_path_buf(),
        })
    }
}

/// Module-name pattern: a leading ASCII letter followed by letters, digits,
/// `_` or `-`.
pub fn valid_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

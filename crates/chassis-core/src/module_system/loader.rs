use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::module_system::error::ModuleSystemError;
use crate::utils::fs as fs_utils;

/// The capability a module unit declares by the folder it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Controller,
    Service,
    Model,
}

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Controller, UnitKind::Service, UnitKind::Model];

    /// Module subfolder holding units of this kind
    pub fn directory(&self) -> &'static str {
        match self {
            UnitKind::Controller => "controllers",
            UnitKind::Service => "services",
            UnitKind::Model => "models",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Controller => write!(f, "controller"),
            UnitKind::Service => write!(f, "service"),
            UnitKind::Model => write!(f, "model"),
        }
    }
}

/// A discovered unit: path plus declared capability, resolved through the
/// typed [`UnitLoader`] rather than any runtime path-based binding.
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    pub module: String,
    pub kind: UnitKind,
    pub name: String,
    pub path: PathBuf,
}

/// A loaded unit as it appears in a module's registry.
#[derive(Debug, Clone)]
pub struct UnitHandle {
    pub name: String,
    pub path: PathBuf,
    pub descriptor: Option<Value>,
}

/// The single typed seam every controller/service/model goes through. A
/// loader failure is scoped to that one unit.
#[async_trait]
pub trait UnitLoader: Send + Sync {
    async fn load(&self, unit: &UnitDescriptor) -> Result<UnitHandle, ModuleSystemError>;
}

/// Default loader: reads the unit file and, for JSON units, validates the
/// descriptor content.
#[derive(Debug, Default, Clone)]
pub struct DescriptorUnitLoader;

#[async_trait]
impl UnitLoader for DescriptorUnitLoader {
    async fn load(&self, unit: &UnitDescriptor) -> Result<UnitHandle, ModuleSystemError> {
        let content = tokio::fs::read_to_string(&unit.path).await.map_err(|source| {
            ModuleSystemError::Io {
                path: unit.path.clone(),
                operation: "read unit".to_string(),
                source,
            }
        })?;

        let descriptor = if unit.path.extension().is_some_and(|ext| ext == "json") {
            let value = serde_json::from_str(&content).map_err(|e| ModuleSystemError::UnitLoad {
                unit: unit.name.clone(),
                message: e.to_string(),
            })?;
            Some(value)
        } else {
            None
        };

        Ok(UnitHandle {
            name: unit.name.clone(),
            path: unit.path.clone(),
            descriptor,
        })
    }
}

/// Enumerate the units of one kind under a module directory, sorted by name
/// for determinism. Nested folders namespace the unit name with dots.
pub fn discover_units(
    module: &str,
    module_path: &Path,
    kind: UnitKind,
) -> io::Result<Vec<UnitDescriptor>> {
    let dir = module_path.join(kind.directory());
    let files = fs_utils::find_files(&dir, &|p: &Path| p.is_file())?;

    let mut units: Vec<UnitDescriptor> = files
        .into_iter()
        .filter_map(|path| {
            let segments = fs_utils::relative_key_path(&dir, &path)?;
            Some(UnitDescriptor {
                module: module.to_string(),
                kind,
                name: segments.join("."),
                path,
            })
        })
        .collect();
    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}

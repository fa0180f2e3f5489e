use std::path::{Path, PathBuf};

use crate::config::env;
use crate::config::error::ConfigSystemError;
use crate::config::format::ConfigFormat;
use crate::config::tree::ConfigTree;
use crate::event::{BootstrapEvent, EventBus};
use crate::utils::fs as fs_utils;

/// Loads a directory of configuration fragments into one merged tree.
///
/// The event bus is injected at construction; every load reports its
/// progress (`config.load`, per-key `config.load.conflict`, `config.loaded`)
/// through it.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    events: EventBus,
}

impl ConfigLoader {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }

    /// Merge every fragment under `path` and activate `environment` scopes.
    ///
    /// Fails with a validation error for malformed arguments and a load
    /// error when the root path cannot be read. Individual fragment failures
    /// are localized: they emit `config.load.error` and are skipped.
    pub async fn load(
        &self,
        path: &Path,
        environment: Option<&str>,
    ) -> Result<ConfigTree, ConfigSystemError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigSystemError::Validation(
                "config path must not be empty".to_string(),
            ));
        }

        self.events
            .emit(&BootstrapEvent::ConfigLoad { path: path.to_path_buf() })
            .await?;

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                let source = std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "config path is not a directory",
                );
                self.emit_load_error(path, &source.to_string()).await?;
                return Err(ConfigSystemError::Load { path: path.to_path_buf(), source });
            }
            Err(source) => {
                self.emit_load_error(path, &source.to_string()).await?;
                return Err(ConfigSystemError::Load { path: path.to_path_buf(), source });
            }
        }

        let fragments = self.enumerate_fragments(path)?;
        log::debug!("merging {} config fragment(s) under {}", fragments.len(), path.display());

        let mut tree = ConfigTree::new();
        for (_, file) in &fragments {
            let Some(segments) = fs_utils::relative_key_path(path, file) else {
                continue;
            };
            let Some(format) = ConfigFormat::from_path(file) else {
                continue;
            };

            let content = match tokio::fs::read_to_string(file).await {
                Ok(content) => content,
                Err(err) => {
                    self.emit_load_error(file, &err.to_string()).await?;
                    continue;
                }
            };
            let value = match format.parse(&content, file) {
                Ok(value) => value,
                Err(err) => {
                    self.emit_load_error(file, &err.to_string()).await?;
                    continue;
                }
            };

            for conflict in tree.merge_at(&segments, value) {
                self.events
                    .emit(&BootstrapEvent::ConfigLoadConflict {
                        key_path: conflict.key_path,
                        previous: conflict.previous,
                        next: conflict.next,
                    })
                    .await?;
            }
        }

        env::activate(&mut tree, environment);

        self.events
            .emit(&BootstrapEvent::ConfigLoaded {
                path: path.to_path_buf(),
                tree: tree.clone(),
            })
            .await?;
        Ok(tree)
    }

    /// Enumerate fragment files, keyed by relative path, in reverse
    /// lexicographic order: alphabetically later fragments merge first and
    /// are overridden by earlier ones when keys collide.
    fn enumerate_fragments(
        &self,
        path: &Path,
    ) -> Result<Vec<(String, PathBuf)>, ConfigSystemError> {
        let files = fs_utils::find_files(path, &|p: &Path| ConfigFormat::from_path(p).is_some())
            .map_err(|source| ConfigSystemError::Io {
                path: path.to_path_buf(),
                operation: "enumerate fragments".to_string(),
                source,
            })?;

        let mut fragments: Vec<(String, PathBuf)> = files
            .into_iter()
            .filter_map(|file| {
                let rel = file.strip_prefix(path).ok()?.to_string_lossy().into_owned();
                Some((rel, file))
            })
            .collect();
        fragments.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(fragments)
    }

    async fn emit_load_error(&self, path: &Path, error: &str) -> Result<(), ConfigSystemError> {
        self.events
            .emit(&BootstrapEvent::ConfigLoadError {
                path: path.to_path_buf(),
                error: error.to_string(),
            })
            .await?;
        Ok(())
    }
}

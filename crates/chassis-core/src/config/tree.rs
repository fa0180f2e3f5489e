use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One non-mergeable key collision produced during a deep merge. The value
/// at `key_path` was `previous` and has been overwritten with `next`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConflict {
    pub key_path: String,
    pub previous: Value,
    pub next: Value,
}

/// An ordered tree of configuration values addressed by dotted key-paths.
///
/// Sibling keys are unique: when a merge collides on a key, the last-loaded
/// value wins and the collision is reported as a [`KeyConflict`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self { root: Map::new() }
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Look up a value by dotted key-path.
    pub fn get(&self, key_path: &str) -> Option<&Value> {
        let mut current = self.root.get(key_path.split('.').next()?)?;
        for segment in key_path.split('.').skip(1) {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up and deserialize a value by dotted key-path.
    pub fn get_as<T: DeserializeOwned>(&self, key_path: &str) -> Option<T> {
        self.get(key_path)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key_path: &str) -> bool {
        self.get(key_path).is_some()
    }

    /// Top-level keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Deep-merge `value` into the tree at the nested key-path `segments`.
    ///
    /// Object/object overlaps merge recursively; any other overlap is
    /// reported as a conflict and overwritten, so each overlapping leaf key
    /// yields exactly one [`KeyConflict`].
    pub fn merge_at(&mut self, segments: &[String], value: Value) -> Vec<KeyConflict> {
        debug_assert!(!segments.is_empty());
        let mut conflicts = Vec::new();
        let mut map = &mut self.root;
        let mut prefix = String::new();

        for segment in &segments[..segments.len() - 1] {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            let entry = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                conflicts.push(KeyConflict {
                    key_path: prefix.clone(),
                    previous: entry.clone(),
                    next: Value::Object(Map::new()),
                });
                *entry = Value::Object(Map::new());
            }
            map = entry.as_object_mut().expect("entry was just made an object");
        }

        let leaf = &segments[segments.len() - 1];
        let leaf_path = if prefix.is_empty() {
            leaf.clone()
        } else {
            format!("{prefix}.{leaf}")
        };
        Self::merge_value(map, leaf, value, &leaf_path, &mut conflicts);
        conflicts
    }

    fn merge_value(
        map: &mut Map<String, Value>,
        key: &str,
        value: Value,
        key_path: &str,
        conflicts: &mut Vec<KeyConflict>,
    ) {
        match map.get_mut(key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                let target = existing.as_object_mut().expect("checked is_object");
                if let Value::Object(incoming) = value {
                    for (child_key, child_value) in incoming {
                        let child_path = format!("{key_path}.{child_key}");
                        Self::merge_value(target, &child_key, child_value, &child_path, conflicts);
                    }
                }
            }
            Some(existing) => {
                conflicts.push(KeyConflict {
                    key_path: key_path.to_string(),
                    previous: existing.clone(),
                    next: value.clone(),
                });
                *existing = value;
            }
            None => {
                map.insert(key.to_string(), value);
            }
        }
    }
}

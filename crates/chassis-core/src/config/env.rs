//! Environment-conditional activation of `env-<code>` scopes.
//!
//! Two names are compatible when either is a prefix of the other, or when
//! the character set of one is a proper subset of the other's. Character
//! sets are order- and duplicate-insensitive, which is why the proper-subset
//! requirement matters: `est` and `test` have equal character sets but must
//! not activate each other. Combinations outside the cases covered by the
//! tests are undefined behavior (see DESIGN.md).

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::tree::ConfigTree;

const ENV_SCOPE_PREFIX: &str = "env-";

/// Extract the scope code from a top-level `env-<code>` key.
pub fn scope_code(key: &str) -> Option<&str> {
    key.strip_prefix(ENV_SCOPE_PREFIX).filter(|code| !code.is_empty())
}

/// Character-set compatibility test between a key (or scope code) and the
/// active environment name.
pub fn env_compatible(code: &str, environment: &str) -> bool {
    if code.is_empty() || environment.is_empty() {
        return false;
    }
    if code.starts_with(environment) || environment.starts_with(code) {
        return true;
    }
    let code_set: HashSet<char> = code.chars().collect();
    let env_set: HashSet<char> = environment.chars().collect();
    if code_set == env_set {
        // Equal sets but neither is a prefix of the other (e.g. "est" vs
        // "test"): not compatible.
        return false;
    }
    code_set.is_subset(&env_set) || code_set.is_superset(&env_set)
}

/// Apply environment activation to a fully assembled tree.
///
/// Every top-level `env-<code>` scope is dropped unless its code is
/// compatible with the active environment; with no active environment no
/// scope ever survives. Inside an activated scope, every key at every depth
/// is tested against the environment using the key's own text.
pub fn activate(tree: &mut ConfigTree, environment: Option<&str>) {
    let root = tree.root_mut();
    let scope_keys: Vec<String> = root
        .keys()
        .filter(|key| scope_code(key).is_some())
        .cloned()
        .collect();

    for key in scope_keys {
        let code = scope_code(&key).expect("key was filtered on scope_code");
        let active = match environment {
            Some(env) => env_compatible(code, env),
            None => false,
        };
        if !active {
            root.remove(&key);
            continue;
        }
        let env = environment.expect("scope only activates with an environment");
        if let Some(Value::Object(scope)) = root.get_mut(&key) {
            prune_scope(scope, env);
        }
    }
}

fn prune_scope(map: &mut Map<String, Value>, environment: &str) {
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        if env_compatible(&key, environment) {
            if let Some(Value::Object(child)) = map.get_mut(&key) {
                prune_scope(child, environment);
            }
        } else {
            map.remove(&key);
        }
    }
}

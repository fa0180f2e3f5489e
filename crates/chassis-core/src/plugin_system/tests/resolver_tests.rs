use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex};

use serde_json::json;
use tempfile::tempdir;

use crate::event::bus::{EventBus, sync_typed_listener};
use crate::event::types::BootstrapEvent;
use crate::event::{Event, EventResult};
use crate::plugin_system::resolver::{alias_map_from_value, AliasMap, AliasTarget, PluginResolver};
use crate::plugin_system::traits::{Plugin, PluginContext};

async fn capture_events(bus: &EventBus) -> Arc<StdMutex<Vec<BootstrapEvent>>> {
    let log = Arc::new(StdMutex::new(Vec::new()));
    let log_clone = Arc::clone(&log);
    bus.register_type_listener::<BootstrapEvent>(sync_typed_listener(
        move |event: &BootstrapEvent| {
            log_clone.lock().unwrap().push(event.clone());
            EventResult::Continue
        },
    ))
    .await
    .unwrap();
    log
}

fn event_names(log: &Arc<StdMutex<Vec<BootstrapEvent>>>) -> Vec<&'static str> {
    log.lock().unwrap().iter().map(|e| e.name()).collect()
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn aliases(value: serde_json::Value) -> AliasMap {
    alias_map_from_value(&value)
}

#[test]
fn test_alias_target_from_value() {
    assert_eq!(AliasTarget::from_value(&json!(false)), AliasTarget::Disabled);
    assert_eq!(
        AliasTarget::from_value(&json!("auth")),
        AliasTarget::Target("auth".to_string())
    );
    assert_eq!(AliasTarget::from_value(&json!(true)), AliasTarget::Invalid);
    assert_eq!(AliasTarget::from_value(&json!(42)), AliasTarget::Invalid);
}

#[tokio::test]
async fn test_distinct_targets_register_under_canonical_names() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("foo.json"), "{}");
    write(&dir.path().join("my/meh.json"), "{}");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"bar": "foo", "foo": "my.meh"})))
        .await
        .unwrap();

    let mut names = registry.names();
    names.sort();
    assert_eq!(names, vec!["foo", "my.meh"]);
    assert!(!registry.contains("bar"));
    assert!(!event_names(&log).contains(&"plugin.load.conflict"));
}

#[tokio::test]
async fn test_same_target_twice_registers_both_aliases_with_one_conflict() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("test.json"), "{}");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"foo": "test", "bar": "test"})))
        .await
        .unwrap();

    let mut names = registry.names();
    names.sort();
    assert_eq!(names, vec!["bar", "foo"]);
    assert!(!registry.contains("test"));

    let conflicts: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            BootstrapEvent::PluginLoadConflict { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].starts_with("Duplicate plugin alias: test"));
}

#[tokio::test]
async fn test_disabled_alias_is_skipped_silently() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("auth.json"), "{}");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"auth": "auth", "extras": false})))
        .await
        .unwrap();

    assert_eq!(registry.names(), vec!["auth"]);
    assert!(!event_names(&log).contains(&"plugin.load.error"));
}

#[tokio::test]
async fn test_invalid_alias_value_emits_error_and_continues() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("auth.json"), "{}");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(
            dir.path(),
            &aliases(json!({"auth": "auth", "bad": 42, "empty": ""})),
        )
        .await
        .unwrap();

    assert_eq!(registry.names(), vec!["auth"]);

    let errors: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            BootstrapEvent::PluginLoadError { error, .. } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 2);
    for error in errors {
        assert_eq!(error, "Plugin map value must be a non-empty string");
    }
}

#[tokio::test]
async fn test_missing_base_path_yields_empty_registry() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("plugins");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(&missing, &aliases(json!({"auth": "auth"})))
        .await
        .unwrap();

    assert!(registry.is_empty());
    assert_eq!(event_names(&log), vec!["plugins.not_found"]);
}

#[tokio::test]
async fn test_unresolved_target_emits_error_and_continues() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("auth.json"), "{}");

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"auth": "auth", "ghost": "ghost"})))
        .await
        .unwrap();

    assert_eq!(registry.names(), vec!["auth"]);

    let errors: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            BootstrapEvent::PluginLoadError { error, .. } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec!["Cannot resolve plugin: ghost".to_string()]);
}

#[derive(Debug)]
struct InstalledProbe;

#[async_trait::async_trait]
impl Plugin for InstalledProbe {
    fn name(&self) -> &str {
        "probe"
    }
}

#[tokio::test]
async fn test_installed_plugin_resolves_when_not_local() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path()).unwrap();

    let bus = EventBus::new();
    let mut resolver = PluginResolver::new(bus);
    resolver.register_installed("probe", Arc::new(|| Arc::new(InstalledProbe)));

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"probe": "probe"})))
        .await
        .unwrap();

    assert!(registry.contains("probe"));
    assert_eq!(registry.get("probe").unwrap().instance.name(), "probe");
}

#[tokio::test]
async fn test_dotted_target_resolves_nested_unit_file() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("my/meh.json"), r#"{"kind": "demo"}"#);
    write(&dir.path().join("auth/plugin.json"), "{}");

    let bus = EventBus::new();
    let resolver = PluginResolver::new(bus);

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"a": "my.meh", "b": "auth"})))
        .await
        .unwrap();

    let mut names = registry.names();
    names.sort();
    assert_eq!(names, vec!["auth", "my.meh"]);
}

#[tokio::test]
async fn test_discover_registers_canonical_names() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("auth.json"), "{}");
    write(&dir.path().join("mail/plugin.json"), "{}");
    write(&dir.path().join("mail/smtp.json"), "{}");

    let bus = EventBus::new();
    let resolver = PluginResolver::new(bus);
    let registry = resolver.discover(dir.path()).await.unwrap();

    // Sorted canonical names; plugin.json names its directory.
    assert_eq!(registry.names(), vec!["auth", "mail", "mail.smtp"]);
}

#[derive(Debug)]
struct FailingInit;

#[async_trait::async_trait]
impl Plugin for FailingInit {
    fn name(&self) -> &str {
        "failing"
    }

    async fn init(
        &self,
        _context: &PluginContext,
    ) -> Result<(), crate::plugin_system::error::PluginSystemError> {
        Err(crate::plugin_system::error::PluginSystemError::InitializationError {
            plugin: "failing".to_string(),
            message: "refused".to_string(),
        })
    }
}

#[tokio::test]
async fn test_failed_initialization_excludes_plugin() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path()).unwrap();

    let bus = EventBus::new();
    let log = capture_events(&bus).await;
    let mut resolver = PluginResolver::new(bus);
    resolver.register_installed("failing", Arc::new(|| Arc::new(FailingInit)));

    let registry = resolver
        .resolve(dir.path(), &aliases(json!({"failing": "failing"})))
        .await
        .unwrap();

    assert!(registry.is_empty());
    assert!(event_names(&log).contains(&"plugin.load.error"));
}

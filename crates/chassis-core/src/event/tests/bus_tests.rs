use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex as StdMutex;

use crate::event::bus::{EventBus, sync_listener, sync_typed_listener};
use crate::event::{Event, EventResult};

#[derive(Debug, Clone)]
struct TestEvent {
    name: &'static str,
    data: String,
}

impl TestEvent {
    fn new(name: &'static str, data: &str) -> Self {
        Self { name, data: data.to_string() }
    }
}

impl Event for TestEvent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Debug, Clone)]
struct OtherEvent;

impl Event for OtherEvent {
    fn name(&self) -> &'static str {
        "other.event"
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[tokio::test]
async fn test_listener_registration_and_emit() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let id = bus
        .register_listener(
            "test.event",
            sync_listener(move |event: &dyn Event| {
                assert_eq!(event.name(), "test.event");
                counter_clone.fetch_add(1, Ordering::SeqCst);
                EventResult::Continue
            }),
        )
        .await
        .unwrap();
    assert!(id > 0);

    bus.emit(&TestEvent::new("test.event", "payload")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // A different name does not reach the listener.
    bus.emit(&TestEvent::new("unrelated.event", "payload")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_listeners_run_in_registration_order() {
    let bus = EventBus::new();
    let order = Arc::new(StdMutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let order_clone = Arc::clone(&order);
        bus.register_listener(
            "ordered.event",
            sync_listener(move |_event: &dyn Event| {
                order_clone.lock().unwrap().push(tag);
                EventResult::Continue
            }),
        )
        .await
        .unwrap();
    }

    bus.emit(&TestEvent::new("ordered.event", "")).await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_failed_listener_does_not_halt_dispatch() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));

    bus.register_listener(
        "fallible.event",
        sync_listener(|_event: &dyn Event| EventResult::Failed("listener broke".to_string())),
    )
    .await
    .unwrap();

    let counter_clone = Arc::clone(&counter);
    bus.register_listener(
        "fallible.event",
        sync_listener(move |_event: &dyn Event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    )
    .await
    .unwrap();

    // Emit succeeds and the second listener still ran.
    bus.emit(&TestEvent::new("fallible.event", "")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_typed_listener_receives_only_its_type() {
    let bus = EventBus::new();
    let seen = Arc::new(StdMutex::new(Vec::new()));

    let seen_clone = Arc::clone(&seen);
    bus.register_type_listener::<TestEvent>(sync_typed_listener(move |event: &TestEvent| {
        seen_clone.lock().unwrap().push(event.data.clone());
        EventResult::Continue
    }))
    .await
    .unwrap();

    bus.emit(&TestEvent::new("typed.event", "hello")).await.unwrap();
    bus.emit(&OtherEvent).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_unregister_listener() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let id = bus
        .register_listener(
            "once.event",
            sync_listener(move |_event: &dyn Event| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                EventResult::Continue
            }),
        )
        .await
        .unwrap();

    bus.emit(&TestEvent::new("once.event", "")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    assert!(bus.unregister_listener(id).await.unwrap());
    bus.emit(&TestEvent::new("once.event", "")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // Unregistering twice finds nothing.
    assert!(!bus.unregister_listener(id).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_emits_reach_every_listener() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    bus.register_listener(
        "burst.event",
        sync_listener(move |_event: &dyn Event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    )
    .await
    .unwrap();

    let emits = (0..16).map(|i| {
        let bus = bus.clone();
        async move {
            bus.emit(&TestEvent::new("burst.event", &i.to_string())).await.unwrap();
        }
    });
    futures::future::join_all(emits).await;

    assert_eq!(counter.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_clones_share_listener_tables() {
    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    bus.register_listener(
        "shared.event",
        sync_listener(move |_event: &dyn Event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    )
    .await
    .unwrap();

    let clone = bus.clone();
    clone.emit(&TestEvent::new("shared.event", "")).await.unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

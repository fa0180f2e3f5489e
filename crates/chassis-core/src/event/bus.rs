use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::event::error::EventSystemError;
use crate::event::{AsyncEventListener, Event, EventResult, ListenerId};

/// An owned future returning the listener's result
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

type Result<T> = std::result::Result<T, EventSystemError>;

//--------------------------------------------------
// EventDispatcher (internal, wrapped by EventBus)
//--------------------------------------------------

/// Listener tables and dispatch logic. Not shared directly; the public
/// [`EventBus`] serializes access behind a mutex.
pub struct EventDispatcher {
    listeners: HashMap<&'static str, Vec<(ListenerId, Box<dyn AsyncEventListener>)>>,
    type_listeners: HashMap<TypeId, Vec<(ListenerId, Box<dyn AsyncEventListener>)>>,
    next_listener_id: ListenerId,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let named: usize = self.listeners.values().map(|v| v.len()).sum();
        let typed: usize = self.type_listeners.values().map(|v| v.len()).sum();
        f.debug_struct("EventDispatcher")
            .field("named_listeners", &named)
            .field("typed_listeners", &typed)
            .field("next_listener_id", &self.next_listener_id)
            .finish()
    }
}

/// Listener for events with a specific name (internal helper)
struct SimpleListener {
    listener: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
}

#[async_trait::async_trait]
impl AsyncEventListener for SimpleListener {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        (self.listener)(event).await
    }
}

/// Listener for events of a specific concrete type (internal helper)
struct TypedListener<E: Event + 'static> {
    listener: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
}

#[async_trait::async_trait]
impl<E: Event + 'static> AsyncEventListener for TypedListener<E> {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        if let Some(e) = event.as_any().downcast_ref::<E>() {
            (self.listener)(e).await
        } else {
            EventResult::Continue
        }
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            type_listeners: HashMap::new(),
            next_listener_id: 1,
        }
    }

    pub fn register_listener(
        &mut self,
        event_name: &'static str,
        listener: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
    ) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        let listener = SimpleListener { listener };
        self.listeners.entry(event_name).or_default().push((id, Box::new(listener)));
        id
    }

    pub fn register_type_listener<E: Event + 'static>(
        &mut self,
        listener: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        let type_id = TypeId::of::<E>();
        let listener = TypedListener { listener };
        self.type_listeners.entry(type_id).or_default().push((id, Box::new(listener)));
        id
    }

    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        let mut found = false;
        self.listeners.values_mut().for_each(|listeners| {
            let len_before = listeners.len();
            listeners.retain(|(l_id, _)| *l_id != id);
            if listeners.len() < len_before {
                found = true;
            }
        });
        self.type_listeners.values_mut().for_each(|listeners| {
            let len_before = listeners.len();
            listeners.retain(|(l_id, _)| *l_id != id);
            if listeners.len() < len_before {
                found = true;
            }
        });
        found
    }

    /// Invoke every matching listener in registration order. A `Failed`
    /// result is logged and swallowed; it never aborts the remaining
    /// listeners or the load pipeline.
    pub async fn dispatch_internal(&self, event: &dyn Event) {
        if let Some(listeners) = self.listeners.get(event.name()) {
            for (id, listener) in listeners {
                if let EventResult::Failed(msg) = listener.handle(event).await {
                    log::warn!("listener {} failed for event '{}': {}", id, event.name(), msg);
                }
            }
        }
        if let Some(listeners) = self.type_listeners.get(&event.as_any().type_id()) {
            for (id, listener) in listeners {
                if let EventResult::Failed(msg) = listener.handle(event).await {
                    log::warn!("listener {} failed for event '{}': {}", id, event.name(), msg);
                }
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// EventBus (public API)
//--------------------------------------------------

/// Thread-safe shared event bus. Cloning yields a handle to the same
/// listener tables; the inner mutex serializes dispatch so listener
/// invocation for concurrently emitted events is never interleaved
/// mid-event.
#[derive(Clone)]
pub struct EventBus {
    dispatcher: Arc<Mutex<EventDispatcher>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { dispatcher: Arc::new(Mutex::new(EventDispatcher::new())) }
    }

    /// Publish an event to every registered listener.
    pub async fn emit(&self, event: &dyn Event) -> Result<()> {
        let dispatcher = self.dispatcher.lock().await;
        dispatcher.dispatch_internal(event).await;
        Ok(())
    }

    pub async fn register_listener(
        &self,
        event_name: &'static str,
        listener: Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>,
    ) -> Result<ListenerId> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.register_listener(event_name, listener))
    }

    pub async fn register_type_listener<E: Event + 'static>(
        &self,
        listener: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> Result<ListenerId> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.register_type_listener::<E>(listener))
    }

    pub async fn unregister_listener(&self, id: ListenerId) -> Result<bool> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.unregister_listener(id))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// Helper Functions
//--------------------------------------------------

/// Wrap a synchronous closure as an async listener
pub fn sync_listener<F>(f: F) -> Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Wrap a synchronous closure as a typed async listener
pub fn sync_typed_listener<E, F>(f: F) -> Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>
where
    E: Event + 'static,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

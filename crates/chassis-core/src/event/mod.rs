//! # Chassis Event System
//!
//! A process-wide publish/subscribe channel shared by the config, plugin and
//! module engines. Components receive the [`EventBus`] at construction time;
//! observers (CLI output, test harnesses) subscribe listeners per bootstrap
//! run and discard them at its end. Listeners run in registration order and
//! a failing listener never halts dispatch.

pub mod bus;
pub mod error;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

/// Type for listener identifiers
pub type ListenerId = u64;

/// Result of a listener invocation.
///
/// `Failed` is reported by a listener that could not process the event; the
/// bus logs it and keeps invoking the remaining listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed successfully
    Continue,
    /// Listener failed; the message is logged and swallowed
    Failed(String),
}

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    /// Clone this event
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Asynchronous event listener trait
#[async_trait]
pub trait AsyncEventListener: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> EventResult;
}

pub use bus::{BoxFuture, EventBus, sync_listener, sync_typed_listener};
pub use types::BootstrapEvent;

#[cfg(test)]
mod tests;

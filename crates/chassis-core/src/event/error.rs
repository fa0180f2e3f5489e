//! # Chassis Event System Errors
//!
//! Defines error types specific to the event bus: listener registration and
//! dispatch problems.

use crate::event::ListenerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Failed to register listener for event '{event_name}': {reason}")]
    ListenerRegistrationFailed {
        event_name: String,
        reason: String,
    },

    #[error("Failed to unregister listener with ID {id}: {reason}")]
    ListenerUnregistrationFailed {
        id: ListenerId,
        reason: String,
    },

    #[error("Event dispatch failed for event '{event_name}': {reason}")]
    DispatchError {
        event_name: String,
        reason: String,
    },

    #[error("Internal event system error: {0}")]
    InternalError(String),
}

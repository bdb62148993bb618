#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in kiln
//!
//! All user-visible progress goes through events; no direct logging or
//! printing is allowed outside the CLI. Library crates push events into an
//! unbounded channel and the CLI drains the receiver and renders.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Pipeline progress events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A pipeline stage started
    OperationStarted { operation: String },

    /// A pipeline stage finished
    OperationCompleted { operation: String, success: bool },

    /// An external command is about to run
    BuildStepStarted { package: String, step: String },

    /// A declared dependency was resolved against the package index
    DependencyResolved { package: String, version: String },

    /// A source patch applied cleanly
    PatchApplied { patch: String },

    /// A copy rule finished, with the number of files it matched
    ArtifactsCopied { pattern: String, count: usize },

    /// Something unexpected but non-fatal
    Warning { message: String },

    /// Internal diagnostics
    DebugLog { message: String },
}

/// Type alias for the event sender side
pub type EventSender = UnboundedSender<Event>;

/// Type alias for the event receiver side
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<Event>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Send an event if a sender is attached, dropping it otherwise
pub fn send_event(sender: Option<&EventSender>, event: Event) {
    if let Some(sender) = sender {
        let _ = sender.send(event);
    }
}

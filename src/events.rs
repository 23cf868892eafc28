//! Normalized event types for streaming generation.
//!
//! This module defines a unified event model for everything the studio
//! streams to the browser: artifact generation progress and persona chat
//! replies both arrive as [`StudioEvent`]s over SSE, independent of the
//! upstream provider's wire format.
//!
//! # Example
//!
//! ```rust
//! use folio_studio::events::{StudioEvent, sse_event};
//!
//! let event = StudioEvent::ArtifactDelta {
//!     artifact_id: "s1_0".to_string(),
//!     text: "<html>".to_string(),
//! };
//! let sse = sse_event(&event);
//! assert!(sse.contains("artifact.delta"));
//! ```

use serde::{Deserialize, Serialize};

use crate::session::ArtifactStatus;

/// Normalized streaming events emitted by the studio orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum StudioEvent {
    // ─────────────────────────────────────────────────────────────────────
    // Stream Lifecycle
    // ─────────────────────────────────────────────────────────────────────
    /// Indicates the start of a new streaming response.
    #[serde(rename = "stream.start")]
    StreamStart {
        /// Unique identifier for this request/response pair.
        request_id: String,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Artifact Generation
    // ─────────────────────────────────────────────────────────────────────
    /// A style direction was resolved for one artifact.
    #[serde(rename = "artifact.label")]
    ArtifactLabel {
        /// Artifact this label belongs to.
        artifact_id: String,
        /// The resolved style direction.
        label: String,
    },

    /// Incremental document text for one artifact.
    #[serde(rename = "artifact.delta")]
    ArtifactDelta {
        /// Artifact the text belongs to.
        artifact_id: String,
        /// The text fragment to append.
        text: String,
    },

    /// One artifact reached a terminal status.
    #[serde(rename = "artifact.done")]
    ArtifactDone {
        /// Artifact that finished.
        artifact_id: String,
        /// Terminal status (`complete` or `error`).
        status: ArtifactStatus,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Persona Chat
    // ─────────────────────────────────────────────────────────────────────
    /// Incremental text delta from a persona chat reply.
    #[serde(rename = "message.delta")]
    MessageDelta {
        /// The text fragment to append.
        text: String,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Errors and Completion
    // ─────────────────────────────────────────────────────────────────────
    /// An error occurred during streaming.
    #[serde(rename = "error")]
    Error {
        /// Error message.
        message: String,
        /// Optional error code for programmatic handling.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// Stream has completed.
    #[serde(rename = "done")]
    Done,
}

/// Convert a [`StudioEvent`] to an SSE-formatted string.
///
/// The output follows the Server-Sent Events specification with both an
/// `event:` line (for EventSource listeners) and a `data:` line containing
/// the JSON payload.
///
/// # Example
///
/// ```rust
/// use folio_studio::events::{StudioEvent, sse_event};
///
/// let sse = sse_event(&StudioEvent::Done);
/// assert!(sse.starts_with("event: done\n"));
/// ```
pub fn sse_event(evt: &StudioEvent) -> String {
    let json = serde_json::to_string(evt).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    });

    let event_name = event_name(evt);

    format!("event: {event_name}\ndata: {json}\n\n")
}

/// Get the SSE event name for a [`StudioEvent`].
pub fn event_name(evt: &StudioEvent) -> &'static str {
    match evt {
        StudioEvent::StreamStart { .. } => "stream.start",
        StudioEvent::ArtifactLabel { .. } => "artifact.label",
        StudioEvent::ArtifactDelta { .. } => "artifact.delta",
        StudioEvent::ArtifactDone { .. } => "artifact.done",
        StudioEvent::MessageDelta { .. } => "message.delta",
        StudioEvent::Error { .. } => "error",
        StudioEvent::Done => "done",
    }
}

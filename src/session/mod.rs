//! Generation sessions and artifact storage.
//!
//! This module provides the in-memory store for generation sessions. Each
//! session is one prompt submission and owns a fixed set of artifacts (draft
//! HTML documents) that fill in as streamed text arrives.
//!
//! # Architecture
//!
//! - [`Session`]: one prompt submission and its artifacts
//! - [`Artifact`]: one draft document and its streaming status
//! - [`SessionStore`]: thread-safe ordered store for all sessions
//!
//! # Example
//!
//! ```rust
//! use folio_studio::session::{ArtifactStatus, SessionStore};
//!
//! let store = SessionStore::new();
//! let session = store.create("a portfolio with my socials").unwrap();
//!
//! assert_eq!(session.artifacts.len(), 3);
//! assert!(session.artifacts.iter().all(|a| a.status == ArtifactStatus::Streaming));
//! ```

mod store;

pub use store::{ARTIFACTS_PER_SESSION, Artifact, ArtifactStatus, Session, SessionStore, StoreError};

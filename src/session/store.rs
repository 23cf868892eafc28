//! Session and artifact storage.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of artifacts generated per session.
pub const ARTIFACTS_PER_SESSION: usize = 3;

/// Placeholder label shown while style directions are being resolved.
const PENDING_LABEL: &str = "Designing...";

/// Errors from store operations keyed by session/artifact id.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// No session with the given id exists.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The session exists but has no artifact with the given id.
    #[error("unknown artifact {artifact} in session {session}")]
    UnknownArtifact {
        /// Session id the lookup ran against.
        session: String,
        /// Artifact id that was not found.
        artifact: String,
    },

    /// The artifact already reached a terminal status.
    #[error("artifact {0} is already finalized")]
    Sealed(String),
}

/// Lifecycle status of a single artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// Text is still arriving.
    Streaming,
    /// Stream ended with non-empty content.
    Complete,
    /// Stream ended empty or failed.
    Error,
}

impl ArtifactStatus {
    /// Whether this status is terminal. Terminal states never revert.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// One generated draft document and its streaming status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique artifact identifier (`<session_id>_<index>`).
    pub id: String,
    /// Display label: the style direction steering this draft.
    pub label: String,
    /// Accumulated document text.
    pub content: String,
    /// Current lifecycle status.
    pub status: ArtifactStatus,
}

impl Artifact {
    fn placeholder(session_id: &str, index: usize) -> Self {
        Self {
            id: format!("{session_id}_{index}"),
            label: PENDING_LABEL.to_string(),
            content: String::new(),
            status: ArtifactStatus::Streaming,
        }
    }
}

/// One prompt submission and its artifacts.
///
/// The prompt is immutable after creation; artifacts are mutated in place
/// as streaming proceeds. Sessions are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// The submitted prompt, trimmed.
    pub prompt: String,
    /// Session creation time.
    pub created_at: DateTime<Utc>,
    /// Exactly [`ARTIFACTS_PER_SESSION`] artifacts.
    pub artifacts: Vec<Artifact>,
}

impl Session {
    fn new(prompt: String) -> Self {
        let id = Uuid::new_v4().to_string();
        let artifacts = (0..ARTIFACTS_PER_SESSION)
            .map(|i| Artifact::placeholder(&id, i))
            .collect();
        Self {
            id,
            prompt,
            created_at: Utc::now(),
            artifacts,
        }
    }

    /// Look up an artifact by id.
    #[must_use]
    pub fn artifact(&self, artifact_id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == artifact_id)
    }
}

/// Thread-safe ordered store for generation sessions.
///
/// The session list is append-only; updates target a single artifact keyed
/// by `(session_id, artifact_id)` and never touch siblings or other
/// sessions. Readers get cloned snapshots.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Vec<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a session for the given prompt and append it to the list.
    ///
    /// The prompt is trimmed first; a whitespace-only prompt creates
    /// nothing and returns `None`.
    #[must_use]
    pub fn create(&self, prompt: &str) -> Option<Session> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return None;
        }

        let session = Session::new(trimmed.to_string());
        let snapshot = session.clone();
        let mut guard = self.inner.write().unwrap();
        guard.push(session);
        Some(snapshot)
    }

    /// Number of sessions created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check whether no sessions exist yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a snapshot of a session by id.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let guard = self.inner.read().unwrap();
        guard.iter().find(|s| s.id == session_id).cloned()
    }

    /// Get a snapshot of a session by list position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<Session> {
        let guard = self.inner.read().unwrap();
        guard.get(index).cloned()
    }

    /// Get the list position of a session.
    #[must_use]
    pub fn index_of(&self, session_id: &str) -> Option<usize> {
        let guard = self.inner.read().unwrap();
        guard.iter().position(|s| s.id == session_id)
    }

    /// Snapshot of all sessions in creation order.
    #[must_use]
    pub fn sessions(&self) -> Vec<Session> {
        self.inner.read().unwrap().clone()
    }

    /// Set the display label of one artifact.
    pub fn set_artifact_label(
        &self,
        session_id: &str,
        artifact_id: &str,
        label: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.with_artifact(session_id, artifact_id, |artifact| {
            artifact.label = label.into();
            Ok(())
        })
    }

    /// Append a streamed chunk to one artifact's content buffer.
    pub fn append_artifact_content(
        &self,
        session_id: &str,
        artifact_id: &str,
        chunk: &str,
    ) -> Result<(), StoreError> {
        self.with_artifact(session_id, artifact_id, |artifact| {
            if artifact.status.is_terminal() {
                return Err(StoreError::Sealed(artifact.id.clone()));
            }
            artifact.content.push_str(chunk);
            Ok(())
        })
    }

    /// Replace an artifact's content with its final text and seal it.
    ///
    /// The terminal status is derived from the final text: `Complete` when
    /// non-empty, `Error` otherwise.
    pub fn finalize_artifact(
        &self,
        session_id: &str,
        artifact_id: &str,
        final_content: String,
    ) -> Result<ArtifactStatus, StoreError> {
        self.with_artifact(session_id, artifact_id, |artifact| {
            if artifact.status.is_terminal() {
                return Err(StoreError::Sealed(artifact.id.clone()));
            }
            let status = if final_content.is_empty() {
                ArtifactStatus::Error
            } else {
                ArtifactStatus::Complete
            };
            artifact.content = final_content;
            artifact.status = status;
            Ok(status)
        })
    }

    /// Seal an artifact as failed, keeping whatever content arrived.
    ///
    /// A no-op on artifacts that already reached a terminal status.
    pub fn abort_artifact(&self, session_id: &str, artifact_id: &str) -> Result<(), StoreError> {
        self.with_artifact(session_id, artifact_id, |artifact| {
            if !artifact.status.is_terminal() {
                artifact.status = ArtifactStatus::Error;
            }
            Ok(())
        })
    }

    /// Run a closure against one artifact under the write lock.
    ///
    /// All mutation goes through here, so an update can only ever touch the
    /// artifact its ids name.
    fn with_artifact<T>(
        &self,
        session_id: &str,
        artifact_id: &str,
        f: impl FnOnce(&mut Artifact) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write().unwrap();
        let session = guard
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;
        let artifact = session
            .artifacts
            .iter_mut()
            .find(|a| a.id == artifact_id)
            .ok_or_else(|| StoreError::UnknownArtifact {
                session: session_id.to_string(),
                artifact: artifact_id.to_string(),
            })?;
        f(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_shape() {
        let store = SessionStore::new();
        let session = store.create("  build my portfolio  ").unwrap();

        assert_eq!(session.prompt, "build my portfolio");
        assert_eq!(session.artifacts.len(), ARTIFACTS_PER_SESSION);
        for (i, artifact) in session.artifacts.iter().enumerate() {
            assert_eq!(artifact.id, format!("{}_{i}", session.id));
            assert_eq!(artifact.label, PENDING_LABEL);
            assert_eq!(artifact.status, ArtifactStatus::Streaming);
            assert!(artifact.content.is_empty());
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_blank_prompt_is_noop() {
        let store = SessionStore::new();
        assert!(store.create("").is_none());
        assert!(store.create("   \n\t ").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sessions_keep_creation_order() {
        let store = SessionStore::new();
        let first = store.create("first").unwrap();
        let second = store.create("second").unwrap();

        let all = store.sessions();
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
        assert_eq!(store.index_of(&second.id), Some(1));
        assert_eq!(store.get_index(0).unwrap().id, first.id);
    }

    #[test]
    fn test_append_and_finalize() {
        let store = SessionStore::new();
        let session = store.create("prompt").unwrap();
        let artifact_id = session.artifacts[0].id.clone();

        store
            .append_artifact_content(&session.id, &artifact_id, "Hel")
            .unwrap();
        store
            .append_artifact_content(&session.id, &artifact_id, "lo")
            .unwrap();

        let status = store
            .finalize_artifact(&session.id, &artifact_id, "Hello".to_string())
            .unwrap();
        assert_eq!(status, ArtifactStatus::Complete);

        let artifact = store.get(&session.id).unwrap().artifacts[0].clone();
        assert_eq!(artifact.content, "Hello");
        assert_eq!(artifact.status, ArtifactStatus::Complete);
    }

    #[test]
    fn test_finalize_empty_is_error() {
        let store = SessionStore::new();
        let session = store.create("prompt").unwrap();
        let artifact_id = session.artifacts[1].id.clone();

        let status = store
            .finalize_artifact(&session.id, &artifact_id, String::new())
            .unwrap();
        assert_eq!(status, ArtifactStatus::Error);
    }

    #[test]
    fn test_sealed_artifact_rejects_updates() {
        let store = SessionStore::new();
        let session = store.create("prompt").unwrap();
        let artifact_id = session.artifacts[0].id.clone();

        store
            .finalize_artifact(&session.id, &artifact_id, "done".to_string())
            .unwrap();

        let append = store.append_artifact_content(&session.id, &artifact_id, "more");
        assert_eq!(append, Err(StoreError::Sealed(artifact_id.clone())));

        let refinalize = store.finalize_artifact(&session.id, &artifact_id, "again".to_string());
        assert_eq!(refinalize, Err(StoreError::Sealed(artifact_id.clone())));

        // Abort is lenient: terminal states never revert.
        store.abort_artifact(&session.id, &artifact_id).unwrap();
        let artifact = store.get(&session.id).unwrap().artifacts[0].clone();
        assert_eq!(artifact.status, ArtifactStatus::Complete);
    }

    #[test]
    fn test_abort_keeps_partial_content() {
        let store = SessionStore::new();
        let session = store.create("prompt").unwrap();
        let artifact_id = session.artifacts[2].id.clone();

        store
            .append_artifact_content(&session.id, &artifact_id, "<half")
            .unwrap();
        store.abort_artifact(&session.id, &artifact_id).unwrap();

        let artifact = store.get(&session.id).unwrap().artifacts[2].clone();
        assert_eq!(artifact.status, ArtifactStatus::Error);
        assert_eq!(artifact.content, "<half");
    }

    #[test]
    fn test_update_isolation() {
        let store = SessionStore::new();
        let a = store.create("session a").unwrap();
        let b = store.create("session b").unwrap();
        let target = a.artifacts[1].id.clone();

        store
            .append_artifact_content(&a.id, &target, "only here")
            .unwrap();
        store.set_artifact_label(&a.id, &target, "Neon Grid").unwrap();

        let a_after = store.get(&a.id).unwrap();
        assert_eq!(a_after.artifacts[1].content, "only here");
        assert_eq!(a_after.artifacts[1].label, "Neon Grid");
        assert!(a_after.artifacts[0].content.is_empty());
        assert!(a_after.artifacts[2].content.is_empty());
        assert_eq!(a_after.artifacts[0].label, PENDING_LABEL);

        let b_after = store.get(&b.id).unwrap();
        for artifact in &b_after.artifacts {
            assert!(artifact.content.is_empty());
            assert_eq!(artifact.status, ArtifactStatus::Streaming);
            assert_eq!(artifact.label, PENDING_LABEL);
        }
    }

    #[test]
    fn test_unknown_ids_are_typed_errors() {
        let store = SessionStore::new();
        let session = store.create("prompt").unwrap();

        let missing_session = store.append_artifact_content("nope", "nope_0", "x");
        assert_eq!(
            missing_session,
            Err(StoreError::UnknownSession("nope".to_string()))
        );

        let missing_artifact = store.append_artifact_content(&session.id, "nope_9", "x");
        assert_eq!(
            missing_artifact,
            Err(StoreError::UnknownArtifact {
                session: session.id.clone(),
                artifact: "nope_9".to_string(),
            })
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ArtifactStatus::Streaming).unwrap();
        assert_eq!(json, "\"streaming\"");
        let json = serde_json::to_string(&ArtifactStatus::Complete).unwrap();
        assert_eq!(json, "\"complete\"");
    }
}

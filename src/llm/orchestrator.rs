//! Studio orchestrator: the two-phase generation pipeline.
//!
//! The orchestrator manages the lifecycle of one prompt submission:
//! 1. Ask the model for three style directions (a JSON array of names)
//! 2. Run three concurrent document streams, one per direction
//! 3. Append chunks to the session's artifacts as they arrive
//! 4. Seal each artifact when its stream ends (complete or error)
//!
//! The submission is finished only when all three artifacts are sealed;
//! one draft failing never aborts its siblings.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_studio::llm::{GenerationSettings, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(settings, profile);
//! let events = orchestrator.generate_session(store.clone(), session);
//! ```

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::events::StudioEvent;
use crate::profile::OwnerProfile;
use crate::session::{ArtifactStatus, Session, SessionStore};

use super::labels::parse_style_labels;
use super::{GeminiDriver, GenRequest, GenerationSettings, TextDriver, Turn};

/// Studio orchestrator.
///
/// Wraps a [`TextDriver`] and adds the label phase, the concurrent
/// artifact fan-out, store updates, and event publication. The driver is
/// swappable for tests.
#[derive(Clone)]
pub struct Orchestrator {
    settings: GenerationSettings,
    profile: Arc<OwnerProfile>,
    driver: Arc<dyn TextDriver>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator backed by the Gemini driver.
    #[must_use]
    pub fn new(settings: GenerationSettings, profile: Arc<OwnerProfile>) -> Self {
        let driver: Arc<dyn TextDriver> = Arc::new(GeminiDriver::new(settings.clone()));
        Self {
            settings,
            profile,
            driver,
        }
    }

    /// Create an orchestrator with an explicit driver.
    #[must_use]
    pub fn with_driver(
        settings: GenerationSettings,
        profile: Arc<OwnerProfile>,
        driver: Arc<dyn TextDriver>,
    ) -> Self {
        Self {
            settings,
            profile,
            driver,
        }
    }

    /// Get the generation settings.
    #[must_use]
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Whether an API key is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// Run the two-phase pipeline for one session.
    ///
    /// Returns a stream of [`StudioEvent`]s:
    /// - `StreamStart` with a unique request ID
    /// - `ArtifactLabel` once per artifact when directions resolve
    /// - `ArtifactDelta` for document text, interleaved across artifacts
    /// - `ArtifactDone` as each artifact seals
    /// - `Error` for caught failures, `Done` when all three have sealed
    ///
    /// The store is updated before each event is published, so a consumer
    /// reading the store after `ArtifactDone` always sees final state.
    pub fn generate_session(
        &self,
        store: SessionStore,
        session: Session,
    ) -> impl Stream<Item = StudioEvent> + Send + use<> {
        let driver = Arc::clone(&self.driver);
        let profile = Arc::clone(&self.profile);
        let request_id = Uuid::new_v4().to_string();

        async_stream::stream! {
            yield StudioEvent::StreamStart {
                request_id: request_id.clone(),
            };

            tracing::info!(
                request_id = %request_id,
                session_id = %session.id,
                prompt = %session.prompt,
                "Starting generation pipeline"
            );

            // Phase one: style directions.
            let style_req = GenRequest::user(profile.style_prompt(&session.prompt));
            let labels = match driver.generate(style_req).await {
                Ok(raw) => {
                    tracing::debug!(
                        request_id = %request_id,
                        response_length = raw.len(),
                        "Style direction response received"
                    );
                    parse_style_labels(&raw)
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        session_id = %session.id,
                        error = %e,
                        "Style direction request failed"
                    );
                    yield StudioEvent::Error {
                        message: e.to_string(),
                        code: Some("STYLE_REQUEST".to_string()),
                    };
                    // Seal everything; a stalled "streaming" artifact helps no one.
                    for artifact in &session.artifacts {
                        if let Err(err) = store.abort_artifact(&session.id, &artifact.id) {
                            tracing::warn!(
                                request_id = %request_id,
                                artifact_id = %artifact.id,
                                error = %err,
                                "Failed to seal artifact after style failure"
                            );
                        }
                        yield StudioEvent::ArtifactDone {
                            artifact_id: artifact.id.clone(),
                            status: ArtifactStatus::Error,
                        };
                    }
                    yield StudioEvent::Done;
                    return;
                }
            };

            for (artifact, label) in session.artifacts.iter().zip(&labels) {
                if let Err(e) = store.set_artifact_label(&session.id, &artifact.id, label.clone()) {
                    tracing::warn!(
                        request_id = %request_id,
                        artifact_id = %artifact.id,
                        error = %e,
                        "Failed to record style label"
                    );
                }
                yield StudioEvent::ArtifactLabel {
                    artifact_id: artifact.id.clone(),
                    label: label.clone(),
                };
            }

            // Phase two: three concurrent document streams, merged as chunks
            // arrive. Each branch writes only to its own artifact id.
            let branches: Vec<_> = session
                .artifacts
                .iter()
                .zip(&labels)
                .map(|(artifact, label)| {
                    artifact_stream(
                        Arc::clone(&driver),
                        store.clone(),
                        session.id.clone(),
                        artifact.id.clone(),
                        profile.artifact_prompt(&session.prompt, label),
                        request_id.clone(),
                    )
                })
                .collect();

            let mut merged = futures::stream::select_all(branches);
            while let Some(event) = merged.next().await {
                yield event;
            }

            tracing::info!(
                request_id = %request_id,
                session_id = %session.id,
                "Generation pipeline complete"
            );
            yield StudioEvent::Done;
        }
    }

    /// Stream a persona chat reply for the given conversation history.
    ///
    /// Returns `StreamStart`, then `MessageDelta`s, then `Done`; a
    /// mid-stream failure yields `Error` followed by `Done`.
    pub async fn chat_with_history(
        &self,
        turns: Vec<Turn>,
    ) -> anyhow::Result<impl Stream<Item = StudioEvent> + Send> {
        let request_id = Uuid::new_v4().to_string();
        let req = GenRequest {
            system: Some(self.profile.chat_system_prompt()),
            turns,
            temperature: None,
        };

        tracing::info!(
            request_id = %request_id,
            turn_count = req.turns.len(),
            "Starting persona chat stream"
        );

        let chunks = self.driver.stream(req).await?;

        let stream = async_stream::stream! {
            yield StudioEvent::StreamStart {
                request_id: request_id.clone(),
            };

            futures::pin_mut!(chunks);
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(text) => {
                        if !text.is_empty() {
                            yield StudioEvent::MessageDelta { text };
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            request_id = %request_id,
                            error = %e,
                            "Persona chat stream failed"
                        );
                        yield StudioEvent::Error {
                            message: e.to_string(),
                            code: None,
                        };
                        yield StudioEvent::Done;
                        return;
                    }
                }
            }

            yield StudioEvent::Done;
        };

        Ok(stream)
    }
}

/// Stream one artifact's document generation, updating the store as chunks
/// arrive and sealing the artifact when the stream ends.
fn artifact_stream(
    driver: Arc<dyn TextDriver>,
    store: SessionStore,
    session_id: String,
    artifact_id: String,
    prompt: String,
    request_id: String,
) -> Pin<Box<dyn Stream<Item = StudioEvent> + Send>> {
    Box::pin(async_stream::stream! {
        let chunks = match driver.stream(GenRequest::user(prompt)).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    artifact_id = %artifact_id,
                    error = %e,
                    "Failed to start artifact stream"
                );
                if let Err(err) = store.abort_artifact(&session_id, &artifact_id) {
                    tracing::warn!(
                        request_id = %request_id,
                        artifact_id = %artifact_id,
                        error = %err,
                        "Failed to seal artifact"
                    );
                }
                yield StudioEvent::ArtifactDone {
                    artifact_id: artifact_id.clone(),
                    status: ArtifactStatus::Error,
                };
                return;
            }
        };

        let mut accumulated = String::new();

        futures::pin_mut!(chunks);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&text);
                    if let Err(e) =
                        store.append_artifact_content(&session_id, &artifact_id, &text)
                    {
                        tracing::warn!(
                            request_id = %request_id,
                            artifact_id = %artifact_id,
                            error = %e,
                            "Dropped chunk"
                        );
                    }
                    yield StudioEvent::ArtifactDelta {
                        artifact_id: artifact_id.clone(),
                        text,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        artifact_id = %artifact_id,
                        error = %e,
                        "Artifact stream failed"
                    );
                    if let Err(err) = store.abort_artifact(&session_id, &artifact_id) {
                        tracing::warn!(
                            request_id = %request_id,
                            artifact_id = %artifact_id,
                            error = %err,
                            "Failed to seal artifact"
                        );
                    }
                    yield StudioEvent::ArtifactDone {
                        artifact_id: artifact_id.clone(),
                        status: ArtifactStatus::Error,
                    };
                    return;
                }
            }
        }

        let final_text = strip_code_fences(&accumulated);
        let status = match store.finalize_artifact(&session_id, &artifact_id, final_text) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    artifact_id = %artifact_id,
                    error = %e,
                    "Failed to finalize artifact"
                );
                ArtifactStatus::Error
            }
        };

        tracing::info!(
            request_id = %request_id,
            artifact_id = %artifact_id,
            status = ?status,
            content_length = accumulated.len(),
            "Artifact sealed"
        );

        yield StudioEvent::ArtifactDone {
            artifact_id: artifact_id.clone(),
            status,
        };
    })
}

/// Strip optional leading/trailing markdown code fences from a document.
///
/// Models asked for raw HTML still wrap it in ```` ```html ```` fences at
/// times; a leading ```` ```html ```` or ```` ``` ```` and a trailing
/// ```` ``` ```` are removed, everything else is kept verbatim.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```html") {
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text.to_string()
}

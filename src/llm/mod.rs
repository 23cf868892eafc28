//! Generation driver traits and implementations.
//!
//! This module provides the abstractions for talking to the hosted
//! generative-language API.
//!
//! # Overview
//!
//! The [`TextDriver`] trait defines the two call styles every driver must
//! support: a single completion and a stream of incremental text chunks.
//! The [`Orchestrator`] builds on top of a driver to run the studio's
//! two-phase generation pipeline and the persona chat.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Gemini v1beta REST API
//!   (`:generateContent` / `:streamGenerateContent`)
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_studio::llm::{GenerationSettings, Orchestrator};
//!
//! let settings = GenerationSettings {
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     api_key: Some("AIza...".to_string()),
//!     model: "gemini-2.0-flash".to_string(),
//!     temperature: 1.0,
//! };
//! ```

pub mod gemini;
pub mod labels;
pub mod orchestrator;

pub use gemini::GeminiDriver;
pub use orchestrator::Orchestrator;

use futures::Stream;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Generation connection and model settings.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Base URL for the generation API.
    pub base_url: String,
    /// API key. `None` means generation is disabled.
    pub api_key: Option<String>,
    /// Model identifier (e.g. `gemini-2.0-flash`).
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f64,
}

impl GenerationSettings {
    /// Whether a usable API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// Visitor input.
    User,
    /// A previous model reply.
    Model,
}

/// One turn of input to the model.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Who authored the turn.
    pub role: TurnRole,
    /// Plain text content.
    pub text: String,
}

impl Turn {
    /// Create a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Request to a text driver.
#[derive(Debug, Clone)]
pub struct GenRequest {
    /// Optional persona/system instruction.
    pub system: Option<String>,
    /// Conversation turns, oldest first.
    pub turns: Vec<Turn>,
    /// Temperature override; falls back to the driver's default.
    pub temperature: Option<f64>,
}

impl GenRequest {
    /// Single-turn user request.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            turns: vec![Turn::user(text)],
            temperature: None,
        }
    }

    /// Attach a system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A stream of incremental text chunks from the model.
pub type TextStream = std::pin::Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send>>;

/// Trait for generation drivers.
///
/// Implementations provide both call styles of the upstream API: a single
/// text completion and a chunked stream.
#[async_trait::async_trait]
pub trait TextDriver: Send + Sync {
    /// Request a single completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unconfigured or the request fails.
    async fn generate(&self, req: GenRequest) -> anyhow::Result<String>;

    /// Request a streamed completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver is unconfigured or the connection
    /// cannot be established; mid-stream failures surface as `Err` items.
    async fn stream(&self, req: GenRequest) -> anyhow::Result<TextStream>;
}

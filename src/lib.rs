//! Folio Studio
//!
//! A self-hosted streaming portfolio studio: renders the owner's profile,
//! chats as the owner's persona, and generates three full HTML portfolio
//! drafts per prompt — streamed live into a browsable grid.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server with SSE streaming
//! - **Generation**: driver abstraction over the Gemini generative-language API
//! - **State**: in-memory session/artifact store plus server-held view state
//! - **UI**: server-rendered HTML shell with a small local client script
//!
//! # Modules
//!
//! - [`llm`]: generation driver trait, Gemini driver, and the studio orchestrator
//! - [`events`]: unified streaming event model
//! - [`session`]: generation sessions and their artifacts
//! - [`nav`]: grid/focus navigation state machine
//! - [`chat`]: persona chat threads

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod events;
pub mod llm;
pub mod nav;
pub mod profile;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::chat::ChatStore;
use crate::config::AppConfig;
use crate::llm::Orchestrator;
use crate::nav::Navigator;
use crate::profile::OwnerProfile;
use crate::session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Studio orchestrator for generation and persona chat.
    pub orchestrator: Arc<Orchestrator>,
    /// Generation session store.
    pub sessions: SessionStore,
    /// Persona chat threads.
    pub chats: ChatStore,
    /// Server-held grid/focus view state.
    pub nav: Arc<RwLock<Navigator>>,
    /// The site owner's profile content.
    pub profile: Arc<OwnerProfile>,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}

//! Folio Studio Server
//!
//! Entry point for the streaming portfolio studio.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::map_err_ignore)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::unused_async)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::default_trait_access)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use folio_studio::AppState;
use folio_studio::chat::ChatStore;
use folio_studio::config::AppConfig;
use folio_studio::llm::Orchestrator;
use folio_studio::nav::Navigator;
use folio_studio::server::start_server;
use folio_studio::session::SessionStore;

#[tokio::main]
async fn main() {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let settings = config.generation_settings();
    let profile = Arc::new(config.owner_profile());

    info!(
        name: "generation.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        configured = settings.is_configured(),
        "Generation configuration loaded"
    );

    if !settings.is_configured() {
        warn!(
            name: "generation.disabled",
            "No API key configured; generation and chat are disabled"
        );
    }

    let orchestrator = Arc::new(Orchestrator::new(settings, Arc::clone(&profile)));

    let state = AppState {
        orchestrator,
        sessions: SessionStore::new(),
        chats: ChatStore::new(),
        nav: Arc::new(RwLock::new(Navigator::new())),
        profile,
        config,
    };

    if let Err(e) = start_server(state).await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}

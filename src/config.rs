//! Layered application configuration.
//!
//! Priority: CLI flag > CLI env var > config file > `GEMINI_API_KEY` >
//! defaults, with `STUDIO_`-prefixed environment variables folded in by the
//! `config` crate (e.g. `STUDIO_SERVER__PORT=8000`). The config file is the
//! user-supplied override surface, so a key placed there deliberately wins
//! over the ambient `GEMINI_API_KEY`.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenerationSettings};
use crate::profile::OwnerProfile;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Model identifier for generation
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub profile: ProfileConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// API key; absent means generation is disabled, not a startup error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    pub name: String,
    pub handle: String,
    pub tagline: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let owner_defaults = OwnerProfile::default();

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("generation.base_url", DEFAULT_BASE_URL)?
            .set_default("generation.model", DEFAULT_MODEL)?
            .set_default("generation.temperature", 1.0)?
            .set_default("profile.name", owner_defaults.name)?
            .set_default("profile.handle", owner_defaults.handle)?
            .set_default("profile.tagline", owner_defaults.tagline)?;

        // 2. Ambient API key. Registered as a (refreshed) default so an
        //    explicit key in the config file still wins over the env var.
        if let Ok(key) = env::var("GEMINI_API_KEY")
            && !key.trim().is_empty()
        {
            builder = builder.set_default("generation.api_key", key)?;
        }

        // 3. Config file: explicit path via --config/CONFIG_FILE, else an
        //    optional ./config.{yaml,toml,json} in the working directory.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }

        // 4. Environment variables (prefixed with STUDIO_)
        //    E.g. STUDIO_SERVER__PORT=8000, STUDIO_GENERATION__API_KEY=...
        builder = builder.add_source(
            Environment::with_prefix("STUDIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 5. Manual CLI overrides (set_override outranks every source, so
        //    a flag beats file and env alike).
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(model) = cli.model {
            builder = builder.set_override("generation.model", model)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Map the generation section onto driver settings.
    #[must_use]
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            base_url: self.generation.base_url.clone(),
            api_key: self
                .generation
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            model: self.generation.model.clone(),
            temperature: self.generation.temperature,
        }
    }

    /// Build the owner profile with configured identity overrides applied.
    #[must_use]
    pub fn owner_profile(&self) -> OwnerProfile {
        OwnerProfile::with_identity(
            &self.profile.name,
            &self.profile.handle,
            &self.profile.tagline,
        )
    }
}

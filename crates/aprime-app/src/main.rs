//! A-Prime application binary - composition root.
//!
//! 1. Load `.env`, parse CLI and load configuration from TOML
//! 2. Open the SQLite session store
//! 3. Build the external backends and the chat orchestrator
//! 4. Serve the axum REST API until Ctrl-C

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use aprime_agents::Backends;
use aprime_api::state::AppState;
use aprime_chat::ChatOrchestrator;
use aprime_core::config::AprimeConfig;
use aprime_storage::{Database, SqliteStore};

use cli::CliArgs;

/// Expand ~ to the home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    match data_dir.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(rest)
        }
        None => PathBuf::from(data_dir),
    }
}

/// Read the persona file once. A missing or unreadable file disables
/// persona-backed identity answers.
fn load_persona(path: Option<&str>) -> Option<String> {
    let path = Path::new(path?);
    match std::fs::read_to_string(path) {
        Ok(text) => {
            tracing::info!(path = %path.display(), chars = text.chars().count(), "Persona loaded");
            Some(text)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Persona file unavailable");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    // Tracing is not up yet; a load failure is reported once it is.
    let (mut config, load_error) = if config_file.exists() {
        match AprimeConfig::load(&config_file) {
            Ok(config) => (config, None),
            Err(e) => (AprimeConfig::default(), Some(e)),
        }
    } else {
        (AprimeConfig::default(), None)
    };
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    config.general.port = args.resolve_port(config.general.port);
    config.providers.apply_env();

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting A-Prime v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), exists = config_file.exists(), "Configuration resolved");
    if let Some(e) = load_error {
        tracing::warn!(path = %config_file.display(), error = %e, "Invalid config file, using defaults");
    }

    config.validate()?;

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    let db_path = data_dir.join("aprime.db");
    let db = Database::new(&db_path)?;
    let store = Arc::new(SqliteStore::new(Arc::new(db)));
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Backends and orchestrator.
    let persona = load_persona(config.general.identity_context_path.as_deref());
    let backends = Backends::from_config(&config.providers, persona)?;
    if !backends.text.is_configured() {
        tracing::warn!("GROQ_API_KEY is not set; model-backed replies are disabled");
    }
    let orchestrator = ChatOrchestrator::from_config(store, &backends, &config);
    let state = AppState::new(orchestrator);

    // API server.
    let addr = format!("{}:{}", args.host, config.general.port);
    if let Err(e) = aprime_api::start_server(&addr, state, shutdown_signal()).await {
        tracing::error!(addr = %addr, error = %e, "API server failed");
        return Err(e.into());
    }

    Ok(())
}

//! Palaver - chat relay and terminal client
//!
#![doc = "Palaver - chat relay and terminal client"]
#![doc = "Main entry point for the Palaver application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use palaver::cli::{Cli, Commands};
use palaver::commands;
use palaver::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Resolve the history DB path into PALAVER_HISTORY_DB so the storage
    // initializer picks it up. CLI flag wins; a value already in the
    // environment wins over the config file.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("PALAVER_HISTORY_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    } else if std::env::var_os("PALAVER_HISTORY_DB").is_none() {
        if let Some(db_path) = &config.storage.path {
            std::env::set_var("PALAVER_HISTORY_DB", db_path);
            tracing::debug!("Using storage DB path from config: {}", db_path);
        }
    }

    // Execute command
    match cli.command {
        Commands::Serve { host, port } => {
            tracing::info!("Starting relay server");
            if let Some(h) = &host {
                tracing::debug!("Using host override: {}", h);
            }
            if let Some(p) = &port {
                tracing::debug!("Using port override: {}", p);
            }

            commands::serve::run_serve(config, host, port).await?;
            Ok(())
        }
        Commands::Chat {
            relay_url,
            mode,
            resume,
        } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(url) = &relay_url {
                tracing::debug!("Using relay URL override: {}", url);
            }
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }

            commands::chat::run_chat(config, relay_url, mode, resume).await?;
            Ok(())
        }
        Commands::History { action } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(action)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("palaver=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

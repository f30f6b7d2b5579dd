//! Palaver - self-hosted AI chat service
//!
//! Main entry point: initializes tracing, loads configuration, applies CLI
//! overrides, and dispatches to the selected subcommand.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use palaver::cli::{Cli, Commands};
use palaver::commands;
use palaver::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let mut config = Config::load(config_path)?;

    match cli.command {
        Commands::Serve { listen, data_dir } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            if let Some(dir) = data_dir {
                config.storage.data_dir = Some(dir);
            }
            config.validate()?;

            tracing::info!("Starting HTTP server");
            commands::serve::run_serve(config).await
        }
        Commands::Chat { data_dir, resume } => {
            if let Some(dir) = data_dir {
                config.storage.data_dir = Some(dir);
            }
            config.validate()?;

            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config, resume).await
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

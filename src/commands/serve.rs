//! `palaver serve` - run the HTTP server

use crate::config::Config;
use crate::error::Result;
use crate::server;

/// Runs the server with the given (already validated) configuration
pub async fn run_serve(config: Config) -> Result<()> {
    server::run(&config).await
}

//! Command-line interface definition for Palaver

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Palaver - chat with an AI model about your text and files
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "PALAVER_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server consumed by the browser client
    Serve {
        /// Listen address override (e.g. 0.0.0.0:8080)
        #[arg(long)]
        listen: Option<String>,

        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Chat interactively from the terminal
    Chat {
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Saved session id to resume
        #[arg(long)]
        resume: Option<i64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

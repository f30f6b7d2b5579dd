//! Configuration management for Palaver
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file with CLI overrides applied on top.

use crate::error::{PalaverError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main configuration structure for Palaver
///
/// Holds everything the server and the interactive chat front end need:
/// upstream provider settings, the listen address, storage locations,
/// and memory behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream chat-completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Flat-file storage locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Long-term memory behavior
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Upstream provider configuration
///
/// Any OpenAI-compatible chat-completion endpoint works; the API key is
/// read from the environment variable named by `api_key_env` so it never
/// lands in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the chat-completion API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Flat-file storage configuration
///
/// Sessions live under `<data_dir>/<archive_dir>/<id>.json`; memory records
/// live in `<data_dir>/<memory_file>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root data directory; when unset, a per-user directory is chosen
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Subdirectory holding one JSON file per saved chat
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// File holding the JSON array of memory records
    #[serde(default = "default_memory_file")]
    pub memory_file: String,
}

fn default_archive_dir() -> String {
    "saved_chats".to_string()
}

fn default_memory_file() -> String {
    "memory.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            archive_dir: default_archive_dir(),
            memory_file: default_memory_file(),
        }
    }
}

impl StorageConfig {
    /// Resolve the root data directory
    ///
    /// Uses the configured `data_dir` when present, otherwise the
    /// platform-specific per-user data directory, falling back to
    /// `./palaver_data` when no home directory can be determined.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("dev", "palaver", "palaver")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("palaver_data"))
    }

    /// Full path of the chat archive directory
    pub fn archive_path(&self) -> PathBuf {
        self.resolve_data_dir().join(&self.archive_dir)
    }

    /// Full path of the memory file
    pub fn memory_path(&self) -> PathBuf {
        self.resolve_data_dir().join(&self.memory_file)
    }
}

/// Long-term memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Record a one-sentence summary after each successful exchange
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,
}

fn default_memory_enabled() -> bool {
    true
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// A missing file is not an error: the defaults are used so the binary
    /// runs out of the box.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Config` when a field is unusable
    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(PalaverError::Config("provider.model must not be empty".to_string()).into());
        }
        if self.provider.api_base.trim().is_empty() {
            return Err(
                PalaverError::Config("provider.api_base must not be empty".to_string()).into(),
            );
        }
        self.server
            .listen
            .parse::<SocketAddr>()
            .map_err(|e| PalaverError::Config(format!("invalid server.listen address: {}", e)))?;
        Ok(())
    }
}

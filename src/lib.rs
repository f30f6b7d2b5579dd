//! Palaver - self-hosted AI chat service
//!
//! Palaver forwards chat messages and uploaded files (images, PDFs, Word
//! documents, plain text) to an OpenAI-compatible chat-completion API and
//! persists sessions as flat JSON files.
//!
//! # Architecture
//!
//! - `providers`: the upstream completion boundary and its default client
//! - `content`: normalization of uploaded files into model input fragments
//! - `assembler`: turn-sequence construction from history plus memory
//! - `session`: the session data model and the driving state machine
//! - `storage`: flat-file chat archive and long-term memory store
//! - `server`: the axum HTTP surface consumed by the browser client
//! - `config`, `cli`, `error`: the usual plumbing
//!
//! # Example
//!
//! ```no_run
//! use palaver::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!     palaver::server::run(&config).await
//! }
//! ```

pub mod assembler;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod providers;
pub mod server;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{PalaverError, Result};
pub use providers::{ChatProvider, Fragment, OpenAiProvider, Turn, TurnRole};
pub use session::{FileAttachment, Message, Role, Session, SessionManager};
pub use storage::{ChatArchive, MemoryRecord, MemoryStore};

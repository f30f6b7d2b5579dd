//! Subcommand handlers
//!
//! Thin glue between the CLI and the library: `serve` runs the HTTP
//! surface, `chat` runs the terminal front end.

pub mod chat;
pub mod serve;

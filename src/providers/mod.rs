//! Upstream provider abstraction and implementations
//!
//! The `ChatProvider` trait is the crate's only network boundary; the
//! OpenAI-compatible implementation is the one shipped by default.

mod base;
mod openai;

pub use base::{ChatProvider, Fragment, ImageRef, Turn, TurnRole};
pub use openai::OpenAiProvider;

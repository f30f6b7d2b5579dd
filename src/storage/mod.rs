//! Flat-file persistence
//!
//! Two stores, both whole-file JSON with no locking: the chat archive
//! (one file per session) and the memory store (one file total). Both are
//! constructed from configuration at startup and injected into whatever
//! needs them; nothing in this crate reaches for process-wide state.

mod archive;
mod memory;

pub use archive::ChatArchive;
pub use memory::{now_rfc3339, MemoryRecord, MemoryStore};

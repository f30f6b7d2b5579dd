//! Chat archive
//!
//! One JSON file per saved session, named by the session's numeric id.
//! Saving overwrites unconditionally (last-writer-wins); loading an unknown
//! id is a typed not-found error. Stored payloads are not validated on
//! read, so a hand-mangled entry surfaces as a parse error downstream.

use crate::error::{PalaverError, Result};
use crate::session::{Session, SessionSummary};
use std::path::{Path, PathBuf};

/// Directory-backed store of saved sessions
///
/// # Examples
///
/// ```no_run
/// use palaver::session::Session;
/// use palaver::storage::ChatArchive;
///
/// # fn main() -> palaver::error::Result<()> {
/// let archive = ChatArchive::new("/tmp/palaver/saved_chats");
/// archive.save(&Session::started_with("Hello"))?;
/// let listing = archive.list()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatArchive {
    dir: PathBuf,
}

impl ChatArchive {
    /// Creates an archive rooted at the given directory
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the entry for a session id
    fn entry_path(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Saves a session, overwriting any existing entry with the same id
    pub fn save(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(self.entry_path(session.id), contents)?;
        tracing::debug!("Saved session {} ({})", session.id, session.title);
        Ok(())
    }

    /// Lists all saved sessions as summaries, oldest first
    ///
    /// A missing archive directory reads as empty. Entries that are not
    /// `.json` files are skipped; a `.json` entry that fails to parse is an
    /// error, not a silent omission.
    pub fn list(&self) -> Result<Vec<SessionSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            let session: Session = serde_json::from_str(&contents).map_err(|e| {
                PalaverError::Storage(format!("malformed archive entry {}: {}", path.display(), e))
            })?;
            summaries.push(session.summary());
        }

        summaries.sort_by_key(|summary| summary.id);
        Ok(summaries)
    }

    /// Loads a session by id
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::NotFound` when no entry exists for `id`;
    /// read and parse failures propagate as-is.
    pub fn load(&self, id: i64) -> Result<Session> {
        let path = self.entry_path(id);
        if !path.exists() {
            return Err(PalaverError::NotFound(format!("chat {} not found", id)).into());
        }
        let contents = std::fs::read_to_string(&path)?;
        let session = serde_json::from_str(&contents)?;
        Ok(session)
    }
}

//! Long-term memory store
//!
//! A single JSON file holding an append-only array of topic/summary
//! records. The file is read and rewritten whole on every update; there is
//! no locking, which is acceptable for the single-user scope of this
//! service. An absent or malformed file reads as empty rather than failing
//! the request that touched it.

use crate::error::Result;
use crate::providers::{ChatProvider, Fragment, Turn};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum characters of question text kept as a record's topic
const TOPIC_MAX_CHARS: usize = 80;

/// Instruction used to distill an exchange into one remembered sentence
const SUMMARIZE_PROMPT: &str =
    "Summarize the user's question in one short sentence for long-term memory. \
     Reply with the sentence only.";

/// One remembered exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The question text, truncated
    pub topic: String,
    /// Model-generated one-sentence summary
    pub summary: String,
    /// RFC-3339 creation time
    pub timestamp: String,
}

/// Flat-file store for memory records
///
/// # Examples
///
/// ```no_run
/// use palaver::storage::MemoryStore;
///
/// # fn main() -> palaver::error::Result<()> {
/// let store = MemoryStore::new("/tmp/palaver/memory.json");
/// let records = store.load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    /// Creates a store backed by the given file path
    ///
    /// The file is not touched until the first `save`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads all records
    ///
    /// An absent file yields an empty list. A file that exists but does not
    /// parse also yields an empty list: the malformed content is logged and
    /// swallowed so a damaged memory file never takes chat down with it.
    pub fn load(&self) -> Result<Vec<MemoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed memory file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Overwrites the backing file with the given records
    ///
    /// The write is whole-file and not atomic; last writer wins.
    pub fn save(&self, records: &[MemoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Appends one record (load, push, save)
    pub fn append(&self, record: MemoryRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)
    }

    /// Distills a question into a one-sentence summary and appends it
    ///
    /// Callers treat a failure here as non-fatal: memory is a best-effort
    /// enrichment, never a reason to fail the exchange it summarizes.
    ///
    /// # Arguments
    ///
    /// * `provider` - Upstream used to generate the summary
    /// * `question` - The user question to remember
    pub async fn remember(&self, provider: &dyn ChatProvider, question: &str) -> Result<()> {
        let turns = [
            Turn::system(SUMMARIZE_PROMPT),
            Turn::user(vec![Fragment::text(question)]),
        ];
        let summary = provider.complete(&turns).await?;

        self.append(MemoryRecord {
            topic: question.trim().chars().take(TOPIC_MAX_CHARS).collect(),
            summary: summary.trim().to_string(),
            timestamp: now_rfc3339(),
        })
    }
}

/// Current UTC time as an RFC-3339 string
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl ChatProvider for CannedProvider {
        async fn complete(&self, _turns: &[Turn]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn record(topic: &str) -> MemoryRecord {
        MemoryRecord {
            topic: topic.to_string(),
            summary: format!("summary of {}", topic),
            timestamp: now_rfc3339(),
        }
    }

    #[test]
    fn test_load_absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("memory.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("memory.json"));

        let records = vec![record("rust"), record("chess")];
        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{this is not json").unwrap();

        let store = MemoryStore::new(&path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_extends_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("memory.json"));

        store.append(record("first")).unwrap();
        store.append(record("second")).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].topic, "first");
        assert_eq!(records[1].topic, "second");
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("nested/deeper/memory.json"));
        store.save(&[record("x")]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remember_appends_summary_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("memory.json"));
        let provider = CannedProvider("  User asked about the weather.  ");

        store
            .remember(&provider, "What is the weather like in Lisbon today?")
            .await
            .unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic, "What is the weather like in Lisbon today?");
        assert_eq!(records[0].summary, "User asked about the weather.");
        assert!(chrono::DateTime::parse_from_rfc3339(&records[0].timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_remember_truncates_long_topics() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("memory.json"));
        let provider = CannedProvider("short summary");

        let question = "why ".repeat(100);
        store.remember(&provider, &question).await.unwrap();

        let records = store.load().unwrap();
        assert_eq!(records[0].topic.chars().count(), TOPIC_MAX_CHARS);
    }
}

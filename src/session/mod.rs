//! Chat session data model
//!
//! Sessions, their messages, and uploaded-file attachments, plus the
//! summary shape the archive listing exposes. A session id is the
//! wall-clock millisecond timestamp of its creation and never changes.

mod manager;

pub use manager::{SessionManager, SessionPhase, FAILED_REPLY_TEXT};

use crate::error::{PalaverError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a derived session title, in characters
const MAX_TITLE_CHARS: usize = 48;

/// Number of leading words used when deriving a title
const TITLE_WORDS: usize = 6;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Authored by the person chatting
    User,
    /// Authored by the model
    Assistant,
}

/// An uploaded file carried on a user message
///
/// The payload travels base64-encoded so the whole session stays a single
/// self-contained JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Original filename as supplied by the uploader
    pub name: String,
    /// Declared MIME type; trusted as-is, never sniffed
    pub media_type: String,
    /// Base64-encoded file contents
    pub data: String,
}

impl FileAttachment {
    /// Creates an attachment from raw bytes
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decodes the payload back to raw bytes
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Storage` if the payload is not valid base64
    pub fn bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| PalaverError::Storage(format!("invalid attachment payload: {}", e)).into())
    }

    /// Renders the attachment as an inline `data:` URL
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One message in a session
///
/// The role is fixed at construction; only user messages carry a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message
    pub role: Role,
    /// Message text (may be empty when only a file was sent)
    pub content: String,
    /// Uploaded file, present only on user messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
}

impl Message {
    /// Creates a user message, optionally carrying a file
    pub fn user(content: impl Into<String>, file: Option<FileAttachment>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            file,
        }
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            file: None,
        }
    }
}

/// One chat conversation
///
/// # Examples
///
/// ```
/// use palaver::session::Session;
///
/// let session = Session::started_with("Hello there, how are you?");
/// assert!(session.id > 0);
/// assert_eq!(session.title, "Hello there, how are you?");
/// assert!(session.messages.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Creation timestamp in milliseconds since the Unix epoch
    pub id: i64,
    /// Short title derived from the first user message
    pub title: String,
    /// Ordered message list, append-only while the session is active
    pub messages: Vec<Message>,
}

impl Session {
    /// Creates a session with an explicit id and title
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Creates a session stamped with the current time, titled from the
    /// opening message text
    pub fn started_with(first_message: &str) -> Self {
        Self::new(Utc::now().timestamp_millis(), derive_title(first_message))
    }

    /// The listing view of this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            title: self.title.clone(),
            date: date_from_id(self.id),
        }
    }
}

/// Listing entry for a saved session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session id
    pub id: i64,
    /// Session title
    pub title: String,
    /// RFC-3339 rendering of the id timestamp
    pub date: String,
}

/// Derives a session title from the first words of a message
///
/// Takes the first few whitespace-separated words, capped at a fixed
/// character budget; blank input falls back to a generic title.
///
/// # Examples
///
/// ```
/// use palaver::session::derive_title;
///
/// assert_eq!(derive_title("Hello"), "Hello");
/// assert_eq!(derive_title("   "), "New chat");
/// ```
pub fn derive_title(content: &str) -> String {
    let words: Vec<&str> = content.split_whitespace().take(TITLE_WORDS).collect();
    if words.is_empty() {
        return "New chat".to_string();
    }
    let title: String = words.join(" ");
    title.chars().take(MAX_TITLE_CHARS).collect()
}

/// Renders a session id as an RFC-3339 UTC date string
///
/// Ids outside the representable range render as the raw number, which
/// keeps the listing total rather than failing on a corrupt filename.
pub fn date_from_id(id: i64) -> String {
    match Utc.timestamp_millis_opt(id).single() {
        Some(ts) => ts.to_rfc3339(),
        None => id.to_string(),
    }
}

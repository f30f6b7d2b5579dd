//! Provider trait and model-request types for Palaver
//!
//! This module defines the `ChatProvider` trait that upstream API clients
//! implement, along with the role-tagged turn and content-fragment types
//! that make up a completion request.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One unit of model input: text or an inline image reference
///
/// The serialized form matches the OpenAI-style content-part wire format,
/// so fragments can be embedded directly into a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    /// Plain text
    Text {
        /// The text content
        text: String,
    },
    /// An image passed by reference (typically a `data:` URL)
    ImageUrl {
        /// The image reference
        image_url: ImageRef,
    },
}

/// Image reference wrapper matching the wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// URL of the image; inline uploads use a base64 `data:` URL
    pub url: String,
}

impl Fragment {
    /// Creates a text fragment
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::providers::Fragment;
    ///
    /// let fragment = Fragment::text("Hello");
    /// assert_eq!(fragment.as_text(), Some("Hello"));
    /// ```
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an image fragment from a URL
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageRef { url: url.into() },
        }
    }

    /// Returns the text content, if this is a text fragment
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }

    /// Returns true if this is an image fragment
    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImageUrl { .. })
    }
}

/// Role of a turn in a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Instructions and context injected by the application
    System,
    /// Content authored by the person chatting
    User,
    /// Content produced by the model
    Assistant,
}

impl TurnRole {
    /// Wire-format name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-tagged turn of a completion request
///
/// A turn carries an ordered list of content fragments. System and
/// assistant turns always hold a single text fragment; user turns may mix
/// text with an image fragment derived from an uploaded file.
///
/// # Examples
///
/// ```
/// use palaver::providers::{Fragment, Turn, TurnRole};
///
/// let turn = Turn::user(vec![Fragment::text("What is this?")]);
/// assert_eq!(turn.role, TurnRole::User);
/// assert_eq!(turn.content.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn
    pub role: TurnRole,
    /// Ordered content fragments
    pub content: Vec<Fragment>,
}

impl Turn {
    /// Creates a system turn with a single text fragment
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: vec![Fragment::text(text)],
        }
    }

    /// Creates a user turn from a list of fragments
    pub fn user(content: Vec<Fragment>) -> Self {
        Self {
            role: TurnRole::User,
            content,
        }
    }

    /// Creates an assistant turn with a single text fragment
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: vec![Fragment::text(text)],
        }
    }
}

/// Trait for upstream chat-completion providers
///
/// The provider receives the fully assembled turn sequence and returns the
/// model's textual reply. It is a black box to the rest of the crate:
/// no retries or backoff happen on either side of this boundary.
///
/// # Examples
///
/// ```no_run
/// use palaver::providers::{ChatProvider, Turn};
/// use palaver::error::Result;
/// use async_trait::async_trait;
///
/// struct CannedProvider;
///
/// #[async_trait]
/// impl ChatProvider for CannedProvider {
///     async fn complete(&self, _turns: &[Turn]) -> Result<String> {
///         Ok("Hello from the model".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Completes a conversation and returns the reply text
    ///
    /// # Arguments
    ///
    /// * `turns` - The ordered turn sequence, system context first
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response carries no
    /// usable reply
    async fn complete(&self, turns: &[Turn]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_text() {
        let fragment = Fragment::text("Hello");
        assert_eq!(fragment.as_text(), Some("Hello"));
        assert!(!fragment.is_image());
    }

    #[test]
    fn test_fragment_image() {
        let fragment = Fragment::image("data:image/png;base64,AAAA");
        assert!(fragment.is_image());
        assert_eq!(fragment.as_text(), None);
    }

    #[test]
    fn test_fragment_text_serialization() {
        let fragment = Fragment::text("Hi");
        let json = serde_json::to_string(&fragment).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"Hi"}"#);
    }

    #[test]
    fn test_fragment_image_serialization() {
        let fragment = Fragment::image("data:image/png;base64,AAAA");
        let json = serde_json::to_string(&fragment).unwrap();
        assert_eq!(
            json,
            r#"{"type":"image_url","image_url":{"url":"data:image/png;base64,AAAA"}}"#
        );
    }

    #[test]
    fn test_turn_role_as_str() {
        assert_eq!(TurnRole::System.as_str(), "system");
        assert_eq!(TurnRole::User.as_str(), "user");
        assert_eq!(TurnRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_turn_constructors() {
        let system = Turn::system("context");
        assert_eq!(system.role, TurnRole::System);
        assert_eq!(system.content[0].as_text(), Some("context"));

        let user = Turn::user(vec![Fragment::text("question")]);
        assert_eq!(user.role, TurnRole::User);

        let assistant = Turn::assistant("answer");
        assert_eq!(assistant.role, TurnRole::Assistant);
        assert_eq!(assistant.content.len(), 1);
    }

    #[test]
    fn test_fragment_round_trip() {
        let fragment = Fragment::image("data:image/jpeg;base64,QUJD");
        let json = serde_json::to_string(&fragment).unwrap();
        let back: Fragment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fragment);
    }
}

//! OpenAI-compatible provider implementation for Palaver
//!
//! This module implements the `ChatProvider` trait over the widely cloned
//! `/chat/completions` endpoint. Anything speaking that dialect works as an
//! upstream: OpenAI itself, a local gateway, or a mock server in tests.

use crate::config::ProviderConfig;
use crate::error::{PalaverError, Result};
use crate::providers::{ChatProvider, Fragment, Turn};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible API provider
///
/// Holds a configured HTTP client and the model/endpoint settings. The API
/// key is resolved once at construction from the environment variable named
/// in the configuration; an absent key is allowed so that keyless local
/// endpoints keep working.
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

/// Request body for the chat-completion endpoint
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
}

/// One wire-format message
///
/// `content` is a plain string for single-text turns and an array of typed
/// parts when a turn mixes text with an image; both encodings are accepted
/// by every compatible server.
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<Fragment>),
}

/// Response body from the chat-completion endpoint
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: WireReply,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Provider settings (endpoint, model, key env var, timeout)
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("palaver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PalaverError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; requests will be sent without authorization",
                config.api_key_env
            );
        }

        tracing::info!(
            "Initialized provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert assembled turns to the wire format
    fn convert_turns(&self, turns: &[Turn]) -> Vec<WireMessage> {
        turns
            .iter()
            .map(|turn| {
                let content = match turn.content.as_slice() {
                    [Fragment::Text { text }] => WireContent::Text(text.clone()),
                    parts => WireContent::Parts(parts.to_vec()),
                };
                WireMessage {
                    role: turn.role.as_str(),
                    content,
                }
            })
            .collect()
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: self.convert_turns(turns),
        };

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!("Requesting completion from {} ({} turns)", url, turns.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Completion request failed: {}", e);
            PalaverError::Provider(format!("Failed to reach completion endpoint: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion endpoint returned {}: {}", status, error_text);
            return Err(PalaverError::Provider(format!(
                "Completion endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            PalaverError::Provider(format!("Failed to parse completion response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PalaverError::Provider("Completion response carried no reply".to_string()).into()
            })
    }
}

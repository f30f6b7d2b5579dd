//! Request handlers for the chat endpoints
//!
//! The contract mirrors what the browser client expects: `{reply}` or
//! `{error}` bodies, 500 for upstream failures, 404 for unknown session
//! ids. The chat endpoint accepts either multipart form data (one message
//! plus an optional file) or a JSON body carrying the full history.

use crate::assembler::assemble;
use crate::error::PalaverError;
use crate::server::AppState;
use crate::session::{FileAttachment, Message, Role, Session, SessionSummary};

use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// JSON chat request carrying the full message history
#[derive(Debug, Deserialize)]
pub struct ChatHistoryRequest {
    /// Ordered message history, oldest first
    pub messages: Vec<Message>,
}

/// Successful chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    /// The model's reply text
    pub reply: String,
}

/// Body of a save-session request
#[derive(Debug, Deserialize)]
pub struct SaveChatRequest {
    /// The session to persist
    pub chat: Session,
}

/// Body of a successful save-session response
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveChatReply {
    /// Human-readable confirmation
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoadChatParams {
    id: i64,
}

/// Error wrapper mapping crate errors onto the wire contract
///
/// `NotFound` becomes 404; everything else is a 500. The body is always
/// `{"error": "..."}`.
pub(crate) struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<PalaverError>() {
            Some(PalaverError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// `POST /api/chat`
///
/// Branches on the request content type: multipart bodies carry one new
/// message (text field plus optional file), JSON bodies carry the whole
/// history. Either way the assembled conversation goes upstream and the
/// reply text comes back as `{reply}`.
pub(crate) async fn chat(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ChatReply>, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let history = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| anyhow::anyhow!("invalid multipart body: {}", e))?;
        vec![message_from_form(multipart).await?]
    } else {
        let Json(body) = Json::<ChatHistoryRequest>::from_request(req, &())
            .await
            .map_err(|e| anyhow::anyhow!("invalid chat body: {}", e))?;
        body.messages
    };

    let memory = if state.memory_enabled {
        state.memory.load().unwrap_or_else(|e| {
            tracing::warn!("Could not load memory: {}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };

    let turns = assemble(&memory, &history);
    let reply = state.provider.complete(&turns).await.map_err(|e| {
        tracing::error!("Upstream completion failed: {}", e);
        ApiError(anyhow::anyhow!("Failed to fetch AI response"))
    })?;

    if state.memory_enabled {
        if let Some(question) = last_user_question(&history) {
            if let Err(e) = state.memory.remember(state.provider.as_ref(), question).await {
                tracing::warn!("Could not record memory: {}", e);
            }
        }
    }

    Ok(Json(ChatReply { reply }))
}

/// `GET /api/list-chats`
pub(crate) async fn list_chats(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    Ok(Json(state.archive.list()?))
}

/// `GET /api/load-chat?id=<id>`
pub(crate) async fn load_chat(
    State(state): State<AppState>,
    Query(params): Query<LoadChatParams>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.archive.load(params.id)?))
}

/// `POST /api/save-chat`
pub(crate) async fn save_chat(
    State(state): State<AppState>,
    Json(body): Json<SaveChatRequest>,
) -> Result<Json<SaveChatReply>, ApiError> {
    state.archive.save(&body.chat)?;
    Ok(Json(SaveChatReply {
        message: "Chat saved successfully".to_string(),
    }))
}

/// Reads one user message out of a multipart form
///
/// Recognized fields: `message` (text) and `file`; anything else is
/// ignored. A form with neither yields an empty user message, which the
/// assembler renders as an empty turn.
async fn message_from_form(mut multipart: Multipart) -> Result<Message, ApiError> {
    let mut text = String::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow::anyhow!("invalid multipart field: {}", e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => {
                text = field
                    .text()
                    .await
                    .map_err(|e| anyhow::anyhow!("unreadable message field: {}", e))?;
            }
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let media_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| anyhow::anyhow!("unreadable file field: {}", e))?;
                file = Some(FileAttachment::new(name, media_type, &bytes));
            }
            _ => {}
        }
    }

    Ok(Message::user(text, file))
}

/// The most recent user message with non-blank text, if any
fn last_user_question(history: &[Message]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|message| message.role == Role::User && !message.content.trim().is_empty())
        .map(|message| message.content.as_str())
}

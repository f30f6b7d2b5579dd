//! Session state machine
//!
//! Owns the in-memory session set and the active-session pointer, and
//! drives the request/response cycle against the provider. The machine is
//! an explicit tagged union of phases rather than implicit control flow:
//! a user message is appended before the provider call and is never rolled
//! back, even when the call fails. Failure appends a fixed-text assistant
//! reply instead.

use crate::assembler::assemble;
use crate::error::{PalaverError, Result};
use crate::providers::ChatProvider;
use crate::session::{FileAttachment, Message, Session};
use crate::storage::MemoryStore;
use std::sync::Arc;

/// Assistant text appended in place of a reply when the provider fails
pub const FAILED_REPLY_TEXT: &str = "Error: Could not get a reply.";

/// Phase of the session state machine
///
/// `Detached` means no session is active; the next send allocates one.
/// `InFlight` exists only inside `send`, between appending the user
/// message and appending the reply (or the failure text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No active session
    Detached,
    /// A session is active and awaiting input
    Ready {
        /// Id of the active session
        id: i64,
    },
    /// A provider request for the active session is in flight
    InFlight {
        /// Id of the active session
        id: i64,
    },
}

/// Drives chat sessions end to end
///
/// One manager serves one front end (the terminal REPL, or a test). It
/// takes `&mut self` for every transition, so a single manager can never
/// overlap two sends.
pub struct SessionManager {
    sessions: Vec<Session>,
    phase: SessionPhase,
    provider: Arc<dyn ChatProvider>,
    memory: MemoryStore,
    memory_enabled: bool,
}

impl SessionManager {
    /// Creates a manager with no sessions and no active pointer
    ///
    /// # Arguments
    ///
    /// * `provider` - Upstream completion boundary
    /// * `memory` - Long-term memory store
    /// * `memory_enabled` - Record a summary after each successful exchange
    pub fn new(provider: Arc<dyn ChatProvider>, memory: MemoryStore, memory_enabled: bool) -> Self {
        Self {
            sessions: Vec::new(),
            phase: SessionPhase::Detached,
            provider,
            memory,
            memory_enabled,
        }
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// All sessions owned by this manager, in creation/adoption order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The active session, if any
    pub fn active(&self) -> Option<&Session> {
        match self.phase {
            SessionPhase::Detached => None,
            SessionPhase::Ready { id } | SessionPhase::InFlight { id } => {
                self.sessions.iter().find(|session| session.id == id)
            }
        }
    }

    /// Returns to the no-active-session phase
    ///
    /// The next `send` will allocate a fresh session. Existing sessions
    /// stay in the set.
    pub fn detach(&mut self) {
        self.phase = SessionPhase::Detached;
    }

    /// Swaps the active pointer to an existing session
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::NotFound` when no session has the given id
    pub fn select(&mut self, id: i64) -> Result<()> {
        if !self.sessions.iter().any(|session| session.id == id) {
            return Err(PalaverError::NotFound(format!("session {} not found", id)).into());
        }
        self.phase = SessionPhase::Ready { id };
        Ok(())
    }

    /// Inserts a session (e.g. loaded from the archive) and selects it
    ///
    /// An existing session with the same id is replaced.
    pub fn adopt(&mut self, session: Session) {
        let id = session.id;
        self.sessions.retain(|existing| existing.id != id);
        self.sessions.push(session);
        self.phase = SessionPhase::Ready { id };
    }

    /// Removes a session from the set
    ///
    /// Clears the active pointer when it pointed at the deleted session.
    /// Returns whether anything was removed; deleting an unknown id is a
    /// no-op.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.id != id);
        let removed = self.sessions.len() < before;

        if removed && self.active_id() == Some(id) {
            self.phase = SessionPhase::Detached;
        }
        removed
    }

    /// Sends one user message through the full cycle
    ///
    /// While detached, a session is allocated first (id from the wall
    /// clock, title from the message text). The user message is appended
    /// immediately; the provider reply, or the fixed failure text, is
    /// appended when the request settles. Returns the appended assistant
    /// message.
    ///
    /// # Arguments
    ///
    /// * `text` - The user's message text (may be empty when a file is sent)
    /// * `file` - Optional uploaded file
    pub async fn send(&mut self, text: &str, file: Option<FileAttachment>) -> Result<&Message> {
        let id = match self.phase {
            SessionPhase::Detached => {
                let session = Session::started_with(text);
                let id = session.id;
                tracing::info!("Starting session {} ({})", id, session.title);
                self.sessions.push(session);
                id
            }
            SessionPhase::Ready { id } | SessionPhase::InFlight { id } => id,
        };

        {
            let session = self.session_mut(id)?;
            session.messages.push(Message::user(text, file));
        }
        self.phase = SessionPhase::InFlight { id };

        let memory = if self.memory_enabled {
            self.memory.load().unwrap_or_else(|e| {
                tracing::warn!("Could not load memory: {}", e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let turns = {
            let session = self.session_mut(id)?;
            assemble(&memory, &session.messages)
        };

        let reply = match self.provider.complete(&turns).await {
            Ok(reply) => {
                if self.memory_enabled && !text.trim().is_empty() {
                    if let Err(e) = self.memory.remember(self.provider.as_ref(), text).await {
                        tracing::warn!("Could not record memory: {}", e);
                    }
                }
                reply
            }
            Err(e) => {
                tracing::error!("Completion failed for session {}: {}", id, e);
                FAILED_REPLY_TEXT.to_string()
            }
        };

        self.phase = SessionPhase::Ready { id };

        let session = self.session_mut(id)?;
        session.messages.push(Message::assistant(reply));
        Ok(session.messages.last().expect("message just appended"))
    }

    fn active_id(&self) -> Option<i64> {
        match self.phase {
            SessionPhase::Detached => None,
            SessionPhase::Ready { id } | SessionPhase::InFlight { id } => Some(id),
        }
    }

    fn session_mut(&mut self, id: i64) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or_else(|| PalaverError::Session(format!("session {} disappeared", id)).into())
    }
}

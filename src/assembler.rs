//! Conversation assembly
//!
//! Builds the turn sequence handed to the provider from a session's message
//! history plus accumulated memory. Order follows the message list exactly;
//! nothing is reordered, merged, or deduplicated here.

use crate::content::normalize;
use crate::providers::{Fragment, Turn};
use crate::session::{Message, Role};
use crate::storage::MemoryRecord;

/// Assembles the model request turns for a conversation
///
/// When memory records exist, a single system turn listing them leads the
/// sequence. Each user message contributes a text fragment when its content
/// is non-blank and a file fragment when a file is attached; assistant
/// messages are carried through verbatim.
///
/// # Examples
///
/// ```
/// use palaver::assembler::assemble;
/// use palaver::session::Message;
///
/// let history = vec![Message::user("Hello", None)];
/// let turns = assemble(&[], &history);
/// assert_eq!(turns.len(), 1);
/// ```
pub fn assemble(memory: &[MemoryRecord], messages: &[Message]) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(messages.len() + 1);

    if !memory.is_empty() {
        turns.push(Turn::system(memory_context(memory)));
    }

    for message in messages {
        match message.role {
            Role::User => {
                let mut content = Vec::new();
                if !message.content.trim().is_empty() {
                    content.push(Fragment::text(message.content.clone()));
                }
                if let Some(file) = &message.file {
                    content.push(normalize(file));
                }
                turns.push(Turn::user(content));
            }
            Role::Assistant => turns.push(Turn::assistant(message.content.clone())),
        }
    }

    turns
}

/// Renders memory records as a system-turn preamble
fn memory_context(memory: &[MemoryRecord]) -> String {
    let mut context = String::from(
        "You have long-term memory of this user's earlier conversations:\n",
    );
    for record in memory {
        context.push_str(&format!("- {}: {}\n", record.topic, record.summary));
    }
    context
}

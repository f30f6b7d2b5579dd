//! `palaver chat` - interactive terminal front end
//!
//! A rustyline REPL over the session state machine. Plain input is sent to
//! the model; slash commands manage sessions, the archive, and a staged
//! file attachment for the next message.

use crate::config::Config;
use crate::error::Result;
use crate::providers::OpenAiProvider;
use crate::session::{FileAttachment, SessionManager};
use crate::storage::{ChatArchive, MemoryStore};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use std::sync::Arc;

/// Runs the interactive chat loop
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `resume` - Saved session id to load before the first prompt
pub async fn run_chat(config: Config, resume: Option<i64>) -> Result<()> {
    let data_dir = config.storage.resolve_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let provider = Arc::new(OpenAiProvider::new(&config.provider)?);
    let archive = ChatArchive::new(config.storage.archive_path());
    let memory = MemoryStore::new(config.storage.memory_path());
    let mut manager = SessionManager::new(provider, memory, config.memory.enabled);

    if let Some(id) = resume {
        manager.adopt(archive.load(id)?);
        println!("Resumed session {}", id);
    }

    println!("{}", "palaver - type /help for commands".dimmed());

    let mut editor = DefaultEditor::new()?;
    let mut staged_file: Option<FileAttachment> = None;

    loop {
        let prompt = match manager.active() {
            Some(session) => format!("[{}] >> ", session.title),
            None => "[new chat] >> ".to_string(),
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        if let Some(command) = input.strip_prefix('/') {
            if !handle_command(command, &mut manager, &archive, &mut staged_file) {
                break;
            }
            continue;
        }

        let reply = manager.send(input, staged_file.take()).await?;
        println!("\n{}\n", reply.content);
    }

    Ok(())
}

/// Handles one slash command; returns false when the loop should exit
fn handle_command(
    command: &str,
    manager: &mut SessionManager,
    archive: &ChatArchive,
    staged_file: &mut Option<FileAttachment>,
) -> bool {
    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");

    match name {
        "help" => print_help(),
        "new" => {
            manager.detach();
            println!("Started a new chat");
        }
        "list" => match archive.list() {
            Ok(listing) if listing.is_empty() => println!("No saved chats"),
            Ok(listing) => {
                for summary in listing {
                    println!("{}  {}  {}", summary.id, summary.date.dimmed(), summary.title);
                }
            }
            Err(e) => eprintln!("{}", format!("Could not list chats: {}", e).red()),
        },
        "load" => match arg.parse::<i64>() {
            Ok(id) => match archive.load(id) {
                Ok(session) => {
                    println!("Loaded {} ({})", session.title, session.id);
                    manager.adopt(session);
                }
                Err(e) => eprintln!("{}", e.to_string().red()),
            },
            Err(_) => eprintln!("{}", "Usage: /load <id>".red()),
        },
        "save" => match manager.active() {
            Some(session) => match archive.save(session) {
                Ok(()) => println!("Saved session {}", session.id),
                Err(e) => eprintln!("{}", format!("Could not save: {}", e).red()),
            },
            None => eprintln!("{}", "No active chat to save".red()),
        },
        "delete" => match arg.parse::<i64>() {
            Ok(id) => {
                if manager.delete(id) {
                    println!("Deleted session {}", id);
                } else {
                    eprintln!("{}", format!("No session {} in this workspace", id).red());
                }
            }
            Err(_) => eprintln!("{}", "Usage: /delete <id>".red()),
        },
        "attach" => match stage_attachment(arg) {
            Ok(file) => {
                println!("Staged {} ({})", file.name, file.media_type);
                *staged_file = Some(file);
            }
            Err(e) => eprintln!("{}", format!("Could not attach: {}", e).red()),
        },
        "quit" | "exit" => return false,
        other => eprintln!("{}", format!("Unknown command: /{}", other).red()),
    }
    true
}

/// Reads a file from disk and stages it for the next message
///
/// The declared MIME type comes from the file extension; the normalizer
/// downstream trusts it as-is.
fn stage_attachment(path: &str) -> Result<FileAttachment> {
    if path.is_empty() {
        anyhow::bail!("usage: /attach <path>");
    }
    let path = Path::new(path);
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let media_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    Ok(FileAttachment::new(name, media_type, &bytes))
}

fn print_help() {
    println!("Commands:");
    println!("  /new            start a new chat");
    println!("  /list           list saved chats");
    println!("  /load <id>      load a saved chat");
    println!("  /save           save the active chat");
    println!("  /delete <id>    remove a chat from this workspace");
    println!("  /attach <path>  attach a file to the next message");
    println!("  /quit           leave");
}

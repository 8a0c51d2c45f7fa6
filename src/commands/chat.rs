//! Interactive chat client handler
//!
//! Connects to a running relay server and drives a readline-based loop.
//! Regular input is submitted as a chat turn; slash commands manage the
//! response mode, image attachments, and saved conversations.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{PalaverError, Result};
use crate::relay::RelayClient;
use crate::response_mode::ResponseMode;
use crate::session::{ChatSession, SubmitOutcome};
use crate::storage::{Conversation, ConversationStore, Message, MessageRole};

/// Start the interactive chat client
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `relay_url` - Optional override for the relay server URL
/// * `mode` - Optional override for the initial response mode
/// * `resume` - Optional conversation ID (or prefix) to resume
pub async fn run_chat(
    config: Config,
    relay_url: Option<String>,
    mode: Option<String>,
    resume: Option<String>,
) -> Result<()> {
    tracing::info!("Starting interactive chat client");

    let relay_url = relay_url.unwrap_or_else(|| config.relay_url());

    let initial_mode = match mode.as_deref() {
        Some(value) => ResponseMode::parse_str(value).map_err(PalaverError::InvalidRequest)?,
        None => ResponseMode::parse_str(&config.chat.response_mode).unwrap_or_default(),
    };

    let store = ConversationStore::open_default()?;
    let relay = Arc::new(RelayClient::new(&relay_url)?);
    let mut session = ChatSession::new(relay, initial_mode);

    if let Some(query) = resume {
        match store.get(&query) {
            Some(conversation) => {
                println!("{}", format!("Resuming: {}", conversation.title).green());
                print_transcript(&conversation);
                session.open(conversation);
            }
            None => {
                println!(
                    "{}",
                    format!("No saved conversation matches '{}'", query).yellow()
                );
            }
        }
    }

    let mut rl = DefaultEditor::new()?;
    let mut pending_images: Vec<String> = Vec::new();

    print_welcome_banner(&relay_url, session.mode());

    loop {
        let prompt = format_prompt(session.mode(), pending_images.len());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() && pending_images.is_empty() {
                    continue;
                }

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::SwitchMode(new_mode)) => {
                        session.set_mode(new_mode);
                        println!("Switched to {} mode\n", new_mode.colored_tag());
                        continue;
                    }
                    Ok(SpecialCommand::Attach(path)) => {
                        attach_image(Path::new(&path), &mut pending_images);
                        continue;
                    }
                    Ok(SpecialCommand::Save) => {
                        match session.save(&store) {
                            Ok(Some(id)) => {
                                let short = id.get(..8).unwrap_or(&id);
                                println!("{}", format!("Saved conversation {}", short).green());
                            }
                            Ok(None) => println!("{}", "Nothing to save yet.".yellow()),
                            Err(e) => eprintln!("{}", format!("Save failed: {}", e).red()),
                        }
                        continue;
                    }
                    Ok(SpecialCommand::New) => {
                        session.start_new();
                        pending_images.clear();
                        println!("Started a new conversation.\n");
                        continue;
                    }
                    Ok(SpecialCommand::List) => {
                        print_conversation_list(&store);
                        continue;
                    }
                    Ok(SpecialCommand::Open(query)) => {
                        match store.get(&query) {
                            Some(conversation) => {
                                println!("{}", format!("Opened: {}", conversation.title).green());
                                print_transcript(&conversation);
                                session.open(conversation);
                                pending_images.clear();
                            }
                            None => println!(
                                "{}",
                                format!("No saved conversation matches '{}'", query).yellow()
                            ),
                        }
                        continue;
                    }
                    Ok(SpecialCommand::Delete(query)) => {
                        match session.delete_conversation(&store, &query) {
                            Ok(true) => {
                                println!("{}", format!("Deleted conversation {}", query).green());
                            }
                            Ok(false) => println!(
                                "{}",
                                format!("No saved conversation matches '{}'", query).yellow()
                            ),
                            Err(e) => eprintln!("{}", format!("Delete failed: {}", e).red()),
                        }
                        continue;
                    }
                    Ok(SpecialCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::None) => {}
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                }

                rl.add_history_entry(trimmed)?;

                let images = std::mem::take(&mut pending_images);
                match session.submit(trimmed, images).await {
                    SubmitOutcome::Answered(message) => print_assistant_message(&message),
                    SubmitOutcome::Fallback(message) => {
                        println!("\n{}\n", message.content.yellow());
                    }
                    SubmitOutcome::RejectedBusy => {
                        println!("{}", "Still waiting on the previous reply.".yellow());
                    }
                    SubmitOutcome::RejectedEmpty => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Display welcome banner at the start of the interactive session
fn print_welcome_banner(relay_url: &str, mode: ResponseMode) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║             Palaver Interactive Chat - Welcome!              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Relay:  {}", relay_url.cyan());
    println!("Mode:   {} ({})\n", mode.colored_tag(), mode.description());
    println!("Type '/help' for available commands, 'exit' to quit");
    println!("Conversations are kept only after '/save'\n");
}

/// Readline prompt showing the active mode and any pending attachments
fn format_prompt(mode: ResponseMode, pending_images: usize) -> String {
    if pending_images > 0 {
        format!("{} [{} attached] > ", mode.colored_tag(), pending_images)
    } else {
        format!("{} > ", mode.colored_tag())
    }
}

/// Read an image file and queue it for the next message
fn attach_image(path: &Path, pending: &mut Vec<String>) {
    match encode_image_attachment(path) {
        Ok(data_url) => {
            pending.push(data_url);
            println!(
                "{}",
                format!("Attached {} ({} pending)", path.display(), pending.len()).green()
            );
        }
        Err(e) => {
            eprintln!("{}", format!("Could not attach {}: {}", path.display(), e).red());
        }
    }
}

/// Encode an image file as a data URL for the relay
///
/// The MIME type is sniffed from the file contents, not the extension.
fn encode_image_attachment(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|e| {
        PalaverError::InvalidRequest(format!(
            "{} is not a recognized image: {}",
            path.display(),
            e
        ))
    })?;

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        BASE64.encode(&bytes)
    ))
}

/// Print a stored conversation transcript
pub(crate) fn print_transcript(conversation: &Conversation) {
    for message in &conversation.messages {
        print_message(message);
    }
    println!();
}

fn print_message(message: &Message) {
    let label = match message.role {
        MessageRole::User => "You".blue().bold(),
        MessageRole::Assistant => "Assistant".green().bold(),
    };

    println!("\n{} ({})", label, message.timestamp.format("%Y-%m-%d %H:%M"));
    if !message.content.is_empty() {
        println!("{}", message.content);
    }
    if message.has_images() {
        println!(
            "{}",
            format!("[{} attached image(s)]", message.images.len()).cyan()
        );
    }
    if let Some(url) = &message.generated_image {
        println!("{}", format!("[generated image] {}", url).cyan());
    }
}

fn print_assistant_message(message: &Message) {
    println!("\n{}\n", message.content);
    if let Some(url) = &message.generated_image {
        println!("{}\n", format!("[generated image] {}", url).cyan());
    }
}

fn print_conversation_list(store: &ConversationStore) {
    let conversations = store.load();
    if conversations.is_empty() {
        println!("{}", "No saved conversations.".yellow());
        return;
    }

    println!();
    for conversation in conversations {
        let id_short = conversation.short_id();
        println!(
            "{}  {}  ({} messages, updated {})",
            id_short.cyan(),
            conversation.title,
            conversation.len(),
            conversation.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Eight-byte PNG signature is enough for format sniffing
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_encode_image_attachment_png() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PNG_MAGIC).unwrap();
        file.write_all(&[0u8; 16]).unwrap();
        file.flush().unwrap();

        let data_url = encode_image_attachment(file.path()).unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));

        let encoded = data_url.trim_start_matches("data:image/png;base64,");
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(&decoded[..8], PNG_MAGIC);
    }

    #[test]
    fn test_encode_image_attachment_rejects_non_image() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"just some text, definitely not pixels").unwrap();
        file.flush().unwrap();

        let result = encode_image_attachment(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_image_attachment_missing_file() {
        let result = encode_image_attachment(Path::new("/nonexistent/cat.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_attach_image_failure_leaves_queue_unchanged() {
        let mut pending = Vec::new();
        attach_image(Path::new("/nonexistent/cat.png"), &mut pending);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_format_prompt_shows_pending_count() {
        let plain = format_prompt(ResponseMode::Detailed, 0);
        assert!(plain.contains("DETAILED"));
        assert!(!plain.contains("attached"));

        let with_images = format_prompt(ResponseMode::Concise, 2);
        assert!(with_images.contains("[2 attached]"));
    }
}

//! Special commands parser for the interactive chat client
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat session. Special commands allow users to:
//! - Switch between response modes (detailed, balanced, concise)
//! - Attach image files to the next message
//! - Save, open, list, and delete conversations
//! - Display help information
//! - Exit the session
//!
//! Command words are case-insensitive; arguments such as conversation
//! IDs and file paths keep their original case.

use crate::response_mode::ResponseMode;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands modify the session state or provide information,
/// rather than being submitted as a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch to a different response mode
    ///
    /// Changes between Detailed, Balanced, and Concise modes. The new
    /// mode applies to every following exchange.
    SwitchMode(ResponseMode),

    /// Attach an image file to the next message
    ///
    /// The file is read and encoded as a data URL when the command runs,
    /// and sent along with the next submitted turn.
    Attach(String),

    /// Save the active conversation
    ///
    /// Creates a stored conversation on first save and updates it in
    /// place afterwards.
    Save,

    /// Start a new conversation
    ///
    /// Drops the active conversation without saving it.
    New,

    /// List saved conversations
    List,

    /// Open a saved conversation by ID or ID prefix
    Open(String),

    /// Delete a saved conversation by ID or ID prefix
    Delete(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a regular chat turn.
    None,
}

/// Parse a user input string into a special command
///
/// Checks if the input matches any special command pattern. Command
/// words are case-insensitive; arguments keep their case so that
/// conversation IDs and file paths survive intact.
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None
/// for non-commands. Returns Err(CommandError) for invalid commands or
/// invalid arguments.
///
/// # Examples
///
/// ```
/// use palaver::commands::special_commands::{parse_special_command, SpecialCommand};
/// use palaver::response_mode::ResponseMode;
///
/// let cmd = parse_special_command("/mode concise").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchMode(ResponseMode::Concise));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    if matches!(lower.as_str(), "exit" | "quit" | "/exit" | "/quit") {
        return Ok(SpecialCommand::Exit);
    }

    // Dispatch on the lowercased command word, keep the argument verbatim
    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_lowercase(), rest.trim()),
        None => (lower, ""),
    };

    match command.as_str() {
        "/mode" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/mode".to_string(),
                    usage: "/mode <detailed|balanced|concise>".to_string(),
                });
            }
            ResponseMode::parse_str(arg)
                .map(SpecialCommand::SwitchMode)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/mode".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/attach" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/attach".to_string(),
                    usage: "/attach <path>".to_string(),
                });
            }
            Ok(SpecialCommand::Attach(arg.to_string()))
        }

        "/save" => {
            if !arg.is_empty() {
                return Err(CommandError::UnsupportedArgument {
                    command: "/save".to_string(),
                    arg: arg.to_string(),
                });
            }
            Ok(SpecialCommand::Save)
        }

        "/new" => {
            if !arg.is_empty() {
                return Err(CommandError::UnsupportedArgument {
                    command: "/new".to_string(),
                    arg: arg.to_string(),
                });
            }
            Ok(SpecialCommand::New)
        }

        "/list" => {
            if !arg.is_empty() {
                return Err(CommandError::UnsupportedArgument {
                    command: "/list".to_string(),
                    arg: arg.to_string(),
                });
            }
            Ok(SpecialCommand::List)
        }

        "/open" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/open".to_string(),
                    usage: "/open <id>".to_string(),
                });
            }
            Ok(SpecialCommand::Open(arg.to_string()))
        }

        "/delete" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/delete".to_string(),
                    usage: "/delete <id>".to_string(),
                });
            }
            Ok(SpecialCommand::Delete(arg.to_string()))
        }

        "/help" | "/?" => Ok(SpecialCommand::Help),

        // Unknown command starting with "/"
        _ => Err(CommandError::UnknownCommand(command)),
    }
}

/// Display help text for special commands
///
/// Shows all available special commands with their descriptions
/// and usage examples.
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
======================================

RESPONSE MODE:
  /mode detailed  - Thorough answers with detail and examples
  /mode balanced  - Clear answers covering the key points
  /mode concise   - Brief, direct answers

IMAGES:
  /attach <path>  - Attach an image file to the next message

CONVERSATIONS:
  /save           - Save the current conversation (updates in place)
  /new            - Start a new conversation (unsaved turns are dropped)
  /list           - List saved conversations
  /open <id>      - Open a saved conversation (full ID or prefix)
  /delete <id>    - Delete a saved conversation (full ID or prefix)

SESSION CONTROL:
  /help           - Show this help message
  /?              - Same as /help
  exit            - Leave the chat
  quit            - Same as exit

NOTES:
  - Command words are case-insensitive; IDs and paths keep their case
  - Messages that ask to draw or generate a picture are routed to the
    image endpoint automatically, unless a file is attached
  - Conversations are only persisted when you run /save
"#
    );
}

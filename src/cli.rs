//! Command-line interface definition for Palaver
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the relay server, the interactive chat
//! client, and conversation history management.

use clap::{Parser, Subcommand};

/// Palaver - chat relay and terminal client
///
/// Relays conversations to an OpenAI-compatible provider and keeps a
/// local history of everything discussed.
#[derive(Parser, Debug, Clone)]
#[command(name = "palaver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation history database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Palaver
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the relay server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start the interactive chat client
    Chat {
        /// Relay server URL (defaults to the configured server address)
        #[arg(long)]
        relay_url: Option<String>,

        /// Response mode: detailed, balanced, or concise
        #[arg(short, long)]
        mode: Option<String>,

        /// Resume a saved conversation by ID or ID prefix
        #[arg(long)]
        resume: Option<String>,
    },

    /// Browse saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        action: HistoryAction,
    },
}

/// Conversation history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// List saved conversations
    List,

    /// Show a conversation transcript
    Show {
        /// Conversation ID or ID prefix
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation ID or ID prefix
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Chat {
                relay_url: None,
                mode: None,
                resume: None,
            },
        }
    }
}

//! Palaver - chat relay and terminal client library
//!
//! This library provides the core functionality for Palaver: a relay
//! server that forwards chat and image-generation requests to an
//! OpenAI-compatible provider, a terminal chat client that talks to the
//! relay, and a local conversation history store.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `relay`: HTTP relay server, its wire types, and the client used by the chat loop
//! - `session`: Conversation state machine driving each chat exchange
//! - `providers`: Upstream OpenAI-compatible API client
//! - `storage`: Conversation history persistence (embedded key-value store)
//! - `intent`: Image-generation intent detection
//! - `response_mode`: Response modes and their generation parameters
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use palaver::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     palaver::relay::serve(&config).await
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod intent;
pub mod providers;
pub mod relay;
pub mod response_mode;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{PalaverError, Result};
pub use response_mode::ResponseMode;
pub use session::{ChatSession, SubmitOutcome};
pub use storage::{Conversation, ConversationStore, Message, MessageRole};

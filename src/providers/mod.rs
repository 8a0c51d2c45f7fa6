//! Provider module for Palaver
//!
//! Contains the upstream AI provider client the relay server forwards
//! conversation turns and image prompts to.

pub mod openai;

pub use openai::{ChatMessage, OpenAiProvider};

//! Response mode types and utilities
//!
//! This module defines the response modes a chat turn can request:
//! - Detailed mode: long, thorough answers (default)
//! - Balanced mode: mid-length answers
//! - Concise mode: short, direct answers
//!
//! Each mode carries the system instruction injected into the upstream
//! request and the derived generation parameters (maximum response length
//! and sampling temperature).

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response mode for a chat exchange
///
/// Determines the injected system instruction and the derived
/// request parameters sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Detailed mode: thorough answers with examples and explanations
    ///
    /// This is the default mode when a request does not specify one.
    #[default]
    Detailed,

    /// Balanced mode: clear answers covering the key points
    Balanced,

    /// Concise mode: brief, direct answers
    Concise,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detailed => write!(f, "detailed"),
            Self::Balanced => write!(f, "balanced"),
            Self::Concise => write!(f, "concise"),
        }
    }
}

impl ResponseMode {
    /// Parse a response mode from a string
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the mode ("detailed", "balanced" or "concise")
    ///
    /// # Returns
    ///
    /// Returns the parsed ResponseMode or an error if the string is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::response_mode::ResponseMode;
    ///
    /// let mode = ResponseMode::parse_str("concise").unwrap();
    /// assert_eq!(mode, ResponseMode::Concise);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "balanced" => Ok(Self::Balanced),
            "concise" => Ok(Self::Concise),
            other => Err(format!("Unknown response mode: {}", other)),
        }
    }

    /// Maximum response length for this mode, in tokens
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Detailed => 3000,
            Self::Balanced => 2000,
            Self::Concise => 1000,
        }
    }

    /// Sampling temperature for this mode
    pub fn temperature(&self) -> f64 {
        match self {
            Self::Detailed => 0.8,
            Self::Balanced => 0.7,
            Self::Concise => 0.6,
        }
    }

    /// System instruction injected ahead of the conversation
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Self::Detailed => {
                "You are a helpful assistant. Give thorough, well-structured answers \
                 with relevant detail, examples, and explanations where they help."
            }
            Self::Balanced => {
                "You are a helpful assistant. Keep answers clear and reasonably \
                 concise, covering the key points without unnecessary elaboration."
            }
            Self::Concise => {
                "You are a helpful assistant. Answer briefly and directly, in a few \
                 sentences at most."
            }
        }
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Detailed => "Thorough answers with detail and examples",
            Self::Balanced => "Clear answers covering the key points",
            Self::Concise => "Brief, direct answers",
        }
    }

    /// Get a colored tag representation of this mode
    ///
    /// # Returns
    ///
    /// A colored string suitable for display in terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Detailed => format!("[{}]", "DETAILED".purple()),
            Self::Balanced => format!("[{}]", "BALANCED".cyan()),
            Self::Concise => format!("[{}]", "CONCISE".green()),
        }
    }

    /// All modes, in display order
    pub fn all() -> [ResponseMode; 3] {
        [Self::Detailed, Self::Balanced, Self::Concise]
    }
}

//! Wire types for the relay HTTP API
//!
//! Request and response bodies use camelCase field names to match the
//! clients this server was built for.

use crate::error::PalaverError;
use crate::providers::ChatMessage;
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Full conversation history, oldest first. A body without this
    /// field, or with a non-array value, is rejected as malformed.
    pub messages: Vec<IncomingMessage>,

    /// Requested response mode; unknown or absent values fall back to
    /// the default mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,
}

/// A single message in a chat relay request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Role of the message sender
    pub role: String,

    /// Text content of the message
    #[serde(default)]
    pub content: String,

    /// Deprecated single-image field, treated as a one-element
    /// `imageUrls`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Images attached to this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
}

impl IncomingMessage {
    /// Normalized image list for this message
    ///
    /// A message carrying both `imageUrl` and `imageUrls` is rejected;
    /// clients must migrate rather than send both.
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::InvalidRequest` when both image fields are
    /// present
    pub fn images(&self) -> Result<Vec<String>, PalaverError> {
        match (&self.image_url, &self.image_urls) {
            (Some(_), Some(_)) => Err(PalaverError::InvalidRequest(
                "message cannot carry both imageUrl and imageUrls".to_string(),
            )),
            (Some(single), None) => Ok(vec![single.clone()]),
            (None, Some(list)) => Ok(list.clone()),
            (None, None) => Ok(Vec::new()),
        }
    }

    /// Convert to the provider message type, normalizing image fields
    pub fn to_chat_message(&self) -> Result<ChatMessage, PalaverError> {
        Ok(ChatMessage {
            role: self.role.clone(),
            content: self.content.clone(),
            images: self.images()?,
        })
    }
}

/// Request body for `POST /api/generate-image`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Description of the image to generate
    #[serde(default)]
    pub prompt: String,
}

/// Success body for `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    /// Assistant reply text
    pub message: String,
}

/// Success body for `POST /api/generate-image`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReply {
    pub success: bool,
    /// URL of the generated image
    pub image_url: String,
    /// Prompt the image was generated from
    pub prompt: String,
}

/// Failure envelope returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub success: bool,
    /// Description of the failure
    pub error: String,
}

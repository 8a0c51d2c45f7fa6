//! Client for the relay HTTP API
//!
//! The chat session talks to the relay through the [`RelayApi`] trait so
//! tests can substitute a scripted implementation; [`RelayClient`] is the
//! HTTP implementation used by the terminal client.

use super::wire::{ChatRequest, ImageRequest, IncomingMessage};
use crate::error::{PalaverError, Result};
use crate::response_mode::ResponseMode;
use crate::storage::Message;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A generated image returned by the relay
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// URL of the generated image
    pub url: String,
    /// Prompt the image was generated from
    pub prompt: String,
}

/// Client-side view of the relay API
///
/// Both operations return the extracted payload on success and an error
/// carrying the relay's failure description otherwise.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Relay a conversation for a chat completion
    async fn chat(&self, messages: &[Message], mode: ResponseMode) -> Result<String>;

    /// Relay a prompt for image generation
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// HTTP client for the relay server
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    /// Create a new relay client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Relay server URL, e.g. `http://127.0.0.1:3000`
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Relay` if HTTP client initialization fails
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("palaver/0.2.0")
            .build()
            .map_err(|e| PalaverError::Relay(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Relay server URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, path: &str, body: &impl serde::Serialize) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| PalaverError::Relay(format!("Relay request failed: {}", e)))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PalaverError::Relay(format!("Failed to parse relay response: {}", e)))?;

        if !status.is_success() || !payload["success"].as_bool().unwrap_or(false) {
            let detail = payload["error"]
                .as_str()
                .unwrap_or("unknown relay error")
                .to_string();
            return Err(PalaverError::Relay(detail).into());
        }

        Ok(payload)
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn chat(&self, messages: &[Message], mode: ResponseMode) -> Result<String> {
        let request = ChatRequest {
            messages: messages.iter().map(outgoing_message).collect(),
            response_mode: Some(mode.to_string()),
        };

        let payload = self.post_json("/api/chat", &request).await?;

        payload["message"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PalaverError::Relay("Relay response missing message".to_string()).into()
            })
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = ImageRequest {
            prompt: prompt.to_string(),
        };

        let payload = self.post_json("/api/generate-image", &request).await?;

        let url = payload["imageUrl"].as_str().map(|s| s.to_string()).ok_or_else(|| {
            PalaverError::Relay("Relay response missing image URL".to_string())
        })?;

        let prompt = payload["prompt"]
            .as_str()
            .unwrap_or(prompt)
            .to_string();

        Ok(GeneratedImage { url, prompt })
    }
}

/// Convert a stored message to its wire form
///
/// Attached images always travel in `imageUrls`; the deprecated
/// single-image field is never emitted.
fn outgoing_message(message: &Message) -> IncomingMessage {
    IncomingMessage {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
        image_url: None,
        image_urls: if message.images.is_empty() {
            None
        } else {
            Some(message.images.clone())
        },
    }
}

//! OpenAI-compatible provider implementation for Palaver
//!
//! This module implements the upstream client the relay server uses for
//! chat completions and image generation. It speaks the OpenAI wire
//! format, so any compatible endpoint can be configured via `api_base`.

use crate::config::ProviderConfig;
use crate::error::{PalaverError, Result};
use crate::response_mode::ResponseMode;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of images requested per generation call.
const IMAGE_COUNT: u32 = 1;

/// Size requested for generated images.
const IMAGE_SIZE: &str = "1024x1024";

/// Quality requested for generated images.
const IMAGE_QUALITY: &str = "standard";

/// A single conversation turn handed to the provider
///
/// Roles follow the OpenAI convention ("user", "assistant"). Attached
/// images are data URLs or remote URLs forwarded as image content parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: String,
    /// Text content of the message
    pub content: String,
    /// Images attached to the message
    pub images: Vec<String>,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::user("Hello!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Creates a new user message with attached images
    pub fn user_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images,
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            images: Vec::new(),
        }
    }
}

/// Request structure for the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f64,
}

/// Message structure in the OpenAI wire format
#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: WireContent,
}

/// Message content: a plain string or a list of typed parts
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Typed content part for multimodal messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrlPart },
}

/// URL wrapper for image content parts
#[derive(Debug, Serialize)]
struct ImageUrlPart {
    url: String,
}

/// Response structure from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Single completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

/// Message within a completion choice
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Request structure for the image generations endpoint
#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
}

/// Response structure from the image generations endpoint
#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

/// Single generated image entry
#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}

/// OpenAI-compatible API provider
///
/// Connects to the configured endpoint for chat completions and image
/// generation. The credential is read once at construction from the
/// environment variable named in the configuration; requests made without
/// a credential fail with a configuration error.
///
/// # Examples
///
/// ```
/// use palaver::config::ProviderConfig;
/// use palaver::providers::OpenAiProvider;
///
/// let provider = OpenAiProvider::new(ProviderConfig::default());
/// assert!(provider.is_ok());
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
    api_key: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider instance
    ///
    /// Reads the API key from the environment variable named in
    /// `config.api_key_env`. A missing key is not an error here; it
    /// surfaces as a configuration error on the first request.
    ///
    /// # Arguments
    ///
    /// * `config` - Provider configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit credential
    ///
    /// Primarily useful for tests where reading the process environment
    /// is not desirable.
    pub fn with_api_key(config: ProviderConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("palaver/0.2.0")
            .build()
            .map_err(|e| PalaverError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if api_key.is_none() {
            tracing::warn!(
                "API key not found in environment variable {}",
                config.api_key_env
            );
        }

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Resolve the credential or fail with a configuration error.
    fn credential(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            PalaverError::Config(format!(
                "API key not set; export {}",
                self.config.api_key_env
            ))
            .into()
        })
    }

    /// Pick the chat model, switching to the vision model when any
    /// message carries attached images.
    fn select_chat_model(&self, messages: &[ChatMessage]) -> &str {
        if messages.iter().any(|m| !m.images.is_empty()) {
            &self.config.vision_model
        } else {
            &self.config.chat_model
        }
    }

    /// Convert conversation messages to the OpenAI wire format
    ///
    /// Text-only messages serialize as a plain string; messages with
    /// images become a typed part list with the text first.
    fn convert_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| {
                let content = if m.images.is_empty() {
                    WireContent::Text(m.content.clone())
                } else {
                    let mut parts = vec![ContentPart::Text {
                        text: m.content.clone(),
                    }];
                    parts.extend(m.images.iter().map(|url| ContentPart::ImageUrl {
                        image_url: ImageUrlPart { url: url.clone() },
                    }));
                    WireContent::Parts(parts)
                };

                WireMessage {
                    role: m.role.clone(),
                    content,
                }
            })
            .collect()
    }

    fn build_chat_request(
        &self,
        messages: &[ChatMessage],
        mode: ResponseMode,
    ) -> ChatCompletionRequest {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(WireMessage {
            role: "system".to_string(),
            content: WireContent::Text(mode.system_instruction().to_string()),
        });
        wire_messages.extend(Self::convert_messages(messages));

        ChatCompletionRequest {
            model: self.select_chat_model(messages).to_string(),
            messages: wire_messages,
            max_tokens: mode.max_tokens(),
            temperature: mode.temperature(),
        }
    }

    fn build_image_request(&self, prompt: &str) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: IMAGE_COUNT,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
        }
    }

    /// Request a chat completion for the given conversation
    ///
    /// The response-mode system instruction is injected as the first
    /// message; token and temperature limits come from the mode.
    ///
    /// # Arguments
    ///
    /// * `messages` - Full conversation history, oldest first
    /// * `mode` - Response mode shaping length and style
    ///
    /// # Returns
    ///
    /// Returns the assistant's reply text
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Config` when no credential is available and
    /// `PalaverError::Provider` for transport errors, non-success upstream
    /// statuses, or responses without a usable message
    pub async fn chat(&self, messages: &[ChatMessage], mode: ResponseMode) -> Result<String> {
        let api_key = self.credential()?;
        let url = format!("{}/chat/completions", self.config.api_base);
        let request = self.build_chat_request(messages, mode);

        tracing::debug!(
            "Sending chat completion: model={}, {} messages, mode={}",
            request.model,
            request.messages.len(),
            mode
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat completion request failed: {}", e);
                PalaverError::Provider(format!("Chat completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Provider returned error {}: {}", status, error_text);
            return Err(PalaverError::Provider(format!(
                "Provider returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}", e);
            PalaverError::Provider(format!("Failed to parse chat completion response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PalaverError::Provider("Provider response contained no message".to_string()).into()
            })
    }

    /// Request a single generated image for the given prompt
    ///
    /// # Arguments
    ///
    /// * `prompt` - Description of the image to generate
    ///
    /// # Returns
    ///
    /// Returns the URL of the generated image
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Config` when no credential is available and
    /// `PalaverError::Provider` for transport errors, non-success upstream
    /// statuses, or responses without an image URL
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let api_key = self.credential()?;
        let url = format!("{}/images/generations", self.config.api_base);
        let request = self.build_image_request(prompt);

        tracing::debug!("Sending image generation: model={}", request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image generation request failed: {}", e);
                PalaverError::Provider(format!("Image generation request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Provider returned error {}: {}", status, error_text);
            return Err(PalaverError::Provider(format!(
                "Provider returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let generation: ImageGenerationResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse image generation response: {}", e);
            PalaverError::Provider(format!("Failed to parse image generation response: {}", e))
        })?;

        generation
            .data
            .into_iter()
            .next()
            .and_then(|datum| datum.url)
            .ok_or_else(|| {
                PalaverError::Provider("Provider response contained no image URL".to_string())
                    .into()
            })
    }
}

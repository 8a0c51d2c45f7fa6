//! Domain types for conversations and messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Role of a message within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message authored by the user
    User,
    /// Message authored by the assistant (or synthesized locally on failure)
    Assistant,
}

impl MessageRole {
    /// Wire representation of the role ("user" / "assistant")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation
///
/// Messages are immutable after creation; they are destroyed only by
/// clearing or deleting the owning conversation. Identifiers are ULIDs,
/// so they sort by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, time-ordered identifier
    pub id: String,

    /// Author role
    pub role: MessageRole,

    /// Text content (may be empty for image-only user turns)
    pub content: String,

    /// Creation timestamp
    pub timestamp: DateTime<Utc>,

    /// User-supplied image references (data URLs or remote URLs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    /// Generated-image reference (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<String>,

    /// Prompt that produced `generated_image` (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

impl Message {
    /// Create a user message with text content only
    pub fn user(content: impl Into<String>) -> Self {
        Self::user_with_images(content, Vec::new())
    }

    /// Create a user message carrying attached image references
    pub fn user_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            id: new_message_id(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            images,
            generated_image: None,
            image_prompt: None,
        }
    }

    /// Create an assistant message with text content only
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            images: Vec::new(),
            generated_image: None,
            image_prompt: None,
        }
    }

    /// Create an assistant message carrying a generated image
    ///
    /// # Arguments
    ///
    /// * `content` - Display text accompanying the image
    /// * `image_url` - The generated image reference
    /// * `prompt` - The prompt that produced the image
    pub fn assistant_image(
        content: impl Into<String>,
        image_url: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: new_message_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            images: Vec::new(),
            generated_image: Some(image_url.into()),
            image_prompt: Some(prompt.into()),
        }
    }

    /// Whether this message carries user-supplied image references
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// A conversation: an ordered sequence of messages plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique, time-ordered identifier
    pub id: String,

    /// Title shown in listings; empty until derived or set explicitly
    #[serde(default)]
    pub title: String,

    /// Ordered message sequence
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with fresh timestamps
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: new_conversation_id(),
            title: String::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, bumping the last-update timestamp
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Number of messages in the conversation
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Display prefix of the id for listings
    ///
    /// Ids generated here are 26-character ULIDs, but a hand-edited
    /// snapshot may hold shorter ones; those are shown whole.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a new unique message identifier
///
/// ULIDs are lexicographically sortable by creation time, which keeps
/// message ids monotonic-ish without a shared counter.
pub fn new_message_id() -> String {
    Ulid::new().to_string()
}

/// Generate a new unique conversation identifier
pub fn new_conversation_id() -> String {
    Ulid::new().to_string()
}

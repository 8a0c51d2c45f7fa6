//! Conversation state for the interactive chat client.
//!
//! A [`ChatSession`] owns at most one active [`Conversation`] and talks to
//! the relay through the [`RelayApi`] seam. Turns run single-flight: while
//! an exchange is awaiting the relay, further submissions are rejected
//! without touching the transcript. The user message is appended before
//! dispatch, and exactly one assistant message is appended afterwards,
//! either the relay reply or a locally synthesized fallback.

use std::sync::Arc;

use crate::error::Result;
use crate::intent::wants_image_generation;
use crate::relay::{GeneratedImage, RelayApi};
use crate::response_mode::ResponseMode;
use crate::storage::{derive_title, Conversation, ConversationStore, Message};

/// Reply text attached to a generated-image assistant message.
const IMAGE_REPLY_TEXT: &str = "Here is the image you asked for.";

/// Assistant reply substituted when the relay call fails.
const FALLBACK_REPLY: &str =
    "Sorry, I could not process that message. Please try again in a moment.";

/// Why a submission was rejected before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRejection {
    /// A prior exchange is still awaiting the relay.
    Busy,
    /// The composed turn has neither text nor attached images.
    Empty,
}

/// Relay route chosen for an accepted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRoute {
    /// Send the conversation transcript for a chat completion.
    Chat,
    /// Send the turn text as an image generation prompt.
    Image { prompt: String },
}

/// Decision returned by [`ChatSession::begin_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnDecision {
    /// Nothing was appended; the turn was refused.
    Rejected(TurnRejection),
    /// The user message was appended and the exchange is now in flight.
    Dispatch(TurnRoute),
}

/// Successful relay result for one exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnReply {
    /// Assistant text from the chat endpoint.
    Chat(String),
    /// Generated image from the image endpoint.
    Image(GeneratedImage),
}

/// Outcome of a composed [`ChatSession::submit`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The relay answered and the assistant message was appended.
    Answered(Message),
    /// The relay failed; a fallback assistant message was appended.
    Fallback(Message),
    /// Rejected without side effects: an exchange is already in flight.
    RejectedBusy,
    /// Rejected without side effects: the turn was empty.
    RejectedEmpty,
}

/// Interactive chat session backed by a relay client.
pub struct ChatSession {
    relay: Arc<dyn RelayApi>,
    conversation: Option<Conversation>,
    in_flight: bool,
    mode: ResponseMode,
}

impl ChatSession {
    pub fn new(relay: Arc<dyn RelayApi>, mode: ResponseMode) -> Self {
        Self {
            relay,
            conversation: None,
            in_flight: false,
            mode,
        }
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.mode = mode;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// ID of the active conversation, if one has been started.
    pub fn active_id(&self) -> Option<&str> {
        self.conversation.as_ref().map(|c| c.id.as_str())
    }

    pub fn message_count(&self) -> usize {
        self.conversation.as_ref().map_or(0, Conversation::len)
    }

    /// Replace the active conversation with a stored one.
    pub fn open(&mut self, conversation: Conversation) {
        self.conversation = Some(conversation);
        self.in_flight = false;
    }

    /// Drop the active conversation without persisting it.
    pub fn start_new(&mut self) {
        self.conversation = None;
        self.in_flight = false;
    }

    /// Validate and record a user turn.
    ///
    /// On acceptance the user message is pushed onto the transcript, the
    /// session is marked in flight, and the caller receives the relay route
    /// to drive. Rejected turns leave the session untouched.
    pub fn begin_turn(&mut self, text: &str, images: Vec<String>) -> TurnDecision {
        if self.in_flight {
            return TurnDecision::Rejected(TurnRejection::Busy);
        }

        let text = text.trim();
        if text.is_empty() && images.is_empty() {
            return TurnDecision::Rejected(TurnRejection::Empty);
        }

        let route = if wants_image_generation(text, !images.is_empty()) {
            TurnRoute::Image {
                prompt: text.to_string(),
            }
        } else {
            TurnRoute::Chat
        };

        let message = if images.is_empty() {
            Message::user(text)
        } else {
            Message::user_with_images(text, images)
        };

        self.conversation
            .get_or_insert_with(Conversation::new)
            .push(message);
        self.in_flight = true;

        TurnDecision::Dispatch(route)
    }

    /// Close the in-flight exchange and append the assistant message.
    ///
    /// A failed exchange still produces a transcript entry: the error is
    /// logged and a fallback reply is appended in its place.
    pub fn complete_turn(&mut self, outcome: Result<TurnReply>) -> Message {
        self.in_flight = false;

        let message = match outcome {
            Ok(TurnReply::Chat(reply)) => Message::assistant(reply),
            Ok(TurnReply::Image(image)) => {
                Message::assistant_image(IMAGE_REPLY_TEXT, image.url, image.prompt)
            }
            Err(e) => {
                tracing::warn!("Exchange failed, appending fallback reply: {}", e);
                Message::assistant(FALLBACK_REPLY)
            }
        };

        if let Some(conversation) = self.conversation.as_mut() {
            conversation.push(message.clone());
        }

        message
    }

    /// Run one full exchange: validate, dispatch to the relay, append the
    /// assistant reply or fallback.
    pub async fn submit(&mut self, text: &str, images: Vec<String>) -> SubmitOutcome {
        match self.begin_turn(text, images) {
            TurnDecision::Rejected(TurnRejection::Busy) => SubmitOutcome::RejectedBusy,
            TurnDecision::Rejected(TurnRejection::Empty) => SubmitOutcome::RejectedEmpty,
            TurnDecision::Dispatch(route) => {
                let outcome = self.dispatch(route).await;
                let failed = outcome.is_err();
                let message = self.complete_turn(outcome);
                if failed {
                    SubmitOutcome::Fallback(message)
                } else {
                    SubmitOutcome::Answered(message)
                }
            }
        }
    }

    async fn dispatch(&self, route: TurnRoute) -> Result<TurnReply> {
        match route {
            TurnRoute::Chat => {
                let messages = self
                    .conversation
                    .as_ref()
                    .map(|c| c.messages.clone())
                    .unwrap_or_default();
                let reply = self.relay.chat(&messages, self.mode).await?;
                Ok(TurnReply::Chat(reply))
            }
            TurnRoute::Image { prompt } => {
                let image = self.relay.generate_image(&prompt).await?;
                Ok(TurnReply::Image(image))
            }
        }
    }

    /// Persist the active conversation, deriving a title on first save.
    ///
    /// Returns the saved conversation ID, or `None` when there is nothing
    /// to save.
    pub fn save(&mut self, store: &ConversationStore) -> Result<Option<String>> {
        let Some(conversation) = self.conversation.as_mut() else {
            return Ok(None);
        };

        if conversation.title.is_empty() {
            conversation.title = derive_title(conversation);
        }

        let mut all = store.load();
        match all.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation.clone(),
            None => all.push(conversation.clone()),
        }
        store.save(&all)?;

        Ok(Some(conversation.id.clone()))
    }

    /// Delete a stored conversation by ID or ID prefix.
    ///
    /// When the deleted conversation is the active one, the session resets
    /// to a fresh state so the next turn starts a new conversation.
    pub fn delete_conversation(&mut self, store: &ConversationStore, id: &str) -> Result<bool> {
        let removed = store.delete(id)?;

        if removed {
            let deleted_active = self
                .conversation
                .as_ref()
                .map_or(false, |c| crate::storage::id_matches(&c.id, id));
            if deleted_active {
                self.start_new();
            }
        }

        Ok(removed)
    }
}

//! Chat relay endpoint

use super::metrics::RequestMetrics;
use super::wire::{ChatReply, ChatRequest};
use super::{AppState, RelayError};
use crate::providers::ChatMessage;
use crate::response_mode::ResponseMode;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

/// Handle `POST /api/chat`
///
/// Validates the body, forwards the conversation to the upstream
/// provider, and returns the assistant reply in the success envelope.
/// Malformed JSON and invalid image fields answer with HTTP 400;
/// provider failures answer with HTTP 502 without leaking detail.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, RelayError> {
    let metrics = RequestMetrics::start("chat");

    match relay_chat(&state, payload).await {
        Ok(reply) => {
            metrics.record_success();
            Ok(Json(reply))
        }
        Err(err) => {
            metrics.record_failure(err.outcome());
            Err(err)
        }
    }
}

async fn relay_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ChatReply, RelayError> {
    let Json(request) = payload?;

    let mode = resolve_mode(request.response_mode.as_deref());

    let mut messages: Vec<ChatMessage> = Vec::with_capacity(request.messages.len());
    for incoming in &request.messages {
        let message = incoming
            .to_chat_message()
            .map_err(|e| RelayError::invalid_request(e.to_string()))?;
        messages.push(message);
    }

    let reply = state
        .provider
        .chat(&messages, mode)
        .await
        .map_err(|e| RelayError::from_provider(e, "process chat request"))?;

    Ok(ChatReply {
        success: true,
        message: reply,
    })
}

/// Resolve the requested response mode, falling back to the default for
/// unknown values.
fn resolve_mode(raw: Option<&str>) -> ResponseMode {
    match raw {
        None => ResponseMode::default(),
        Some(value) => ResponseMode::parse_str(value).unwrap_or_else(|_| {
            tracing::debug!("Unknown response mode {:?}, using default", value);
            ResponseMode::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode_absent_uses_default() {
        assert_eq!(resolve_mode(None), ResponseMode::Detailed);
    }

    #[test]
    fn test_resolve_mode_parses_known_values() {
        assert_eq!(resolve_mode(Some("concise")), ResponseMode::Concise);
        assert_eq!(resolve_mode(Some("balanced")), ResponseMode::Balanced);
        assert_eq!(resolve_mode(Some("detailed")), ResponseMode::Detailed);
    }

    #[test]
    fn test_resolve_mode_unknown_falls_back() {
        assert_eq!(resolve_mode(Some("verbose")), ResponseMode::Detailed);
        assert_eq!(resolve_mode(Some("")), ResponseMode::Detailed);
    }
}

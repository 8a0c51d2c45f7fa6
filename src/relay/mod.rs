//! HTTP relay server
//!
//! Exposes the two endpoints the chat client talks to: `POST /api/chat`
//! for chat completions and `POST /api/generate-image` for image
//! generation. The server holds no per-conversation state; it validates
//! each request, forwards it to the upstream provider, and wraps the
//! outcome in a uniform success or failure envelope.

pub mod chat;
pub mod client;
pub mod image;
pub mod metrics;
pub mod wire;

pub use client::{GeneratedImage, RelayApi, RelayClient};

use crate::config::Config;
use crate::error::{PalaverError, Result};
use crate::providers::OpenAiProvider;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

/// Shared state available to request handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream provider client
    pub provider: Arc<OpenAiProvider>,
}

impl AppState {
    /// Build handler state from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider client cannot be constructed
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = OpenAiProvider::new(config.provider.clone())?;
        Ok(Self {
            provider: Arc::new(provider),
        })
    }
}

/// Build the relay router with all routes attached
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::handle_chat))
        .route("/api/generate-image", post(image::handle_generate_image))
        .with_state(state)
}

/// Run the relay server until the process is stopped
///
/// Binds to the configured host and port and serves requests on the
/// current tokio runtime.
///
/// # Errors
///
/// Returns error if the provider cannot be constructed, the address
/// cannot be bound, or the server loop fails
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PalaverError::Relay(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Relay server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| PalaverError::Relay(format!("Server error: {}", e)))?;

    Ok(())
}

/// Error carried out of a request handler
///
/// Pairs an HTTP status with the message placed in the failure envelope.
/// Upstream failure details never reach the body; they are logged
/// server-side and replaced with a generic description.
#[derive(Debug)]
pub struct RelayError {
    /// HTTP status for the response
    pub status: StatusCode,
    /// Message placed in the failure envelope
    pub message: String,
}

impl RelayError {
    /// Client sent a request the relay cannot process (HTTP 400)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// The relay itself is misconfigured (HTTP 500)
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// The upstream provider failed (HTTP 502)
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    /// Map a provider failure to a handler error
    ///
    /// Missing-credential errors surface as configuration errors; every
    /// other failure is logged with its detail and surfaced as a generic
    /// upstream error so provider internals do not leak to clients.
    pub fn from_provider(err: anyhow::Error, action: &str) -> Self {
        match err.downcast_ref::<PalaverError>() {
            Some(PalaverError::Config(msg)) => {
                tracing::error!("Configuration error while trying to {}: {}", action, msg);
                Self::configuration(msg.clone())
            }
            _ => {
                tracing::error!("Upstream failure while trying to {}: {}", action, err);
                Self::upstream(format!("Failed to {}", action))
            }
        }
    }

    /// Outcome label used for metrics
    pub fn outcome(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST => "invalid_request",
            StatusCode::INTERNAL_SERVER_ERROR => "config_error",
            _ => "upstream_error",
        }
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_request(rejection.body_text())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = wire::ErrorReply {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

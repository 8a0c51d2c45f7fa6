//! Image generation relay endpoint

use super::metrics::RequestMetrics;
use super::wire::{ImageReply, ImageRequest};
use super::{AppState, RelayError};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

/// Handle `POST /api/generate-image`
///
/// Validates the prompt, forwards it to the upstream provider, and
/// returns the generated image URL together with the prompt it was
/// generated from.
pub async fn handle_generate_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ImageReply>, RelayError> {
    let metrics = RequestMetrics::start("image");

    match relay_image(&state, payload).await {
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

async fn relay_image(
    state: &AppState,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<ImageReply, RelayError> {
    let Json(request) = payload?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(RelayError::invalid_request("prompt cannot be empty"));
    }

    let image_url = state
        .provider
        .generate_image(prompt)
        .await
        .map_err(|e| RelayError::from_provider(e, "generate image"))?;

    Ok(ImageReply {
        success: true,
        image_url,
        prompt: prompt.to_string(),
    })
}

//! Axum Handlers for the Webhook API
//!
//! This module adapts HTTP requests onto the core `CallHandler` pipeline.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use responder_core::{fulfillment::Fulfillment, handler::ReplySource, query::RequestError};
use std::sync::Arc;
use tracing::warn;

use crate::{
    models::{ErrorResponse, HealthResponse},
    state::AppState,
};

/// Largest webhook body accepted, in bytes.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            ApiError::PayloadTooLarge => {
                let error = "Request body too large".to_string();
                (StatusCode::PAYLOAD_TOO_LARGE, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            RequestError::MalformedRequest.into()
        }
    }
}

/// Answer a caller's utterance with a generated reply.
///
/// Once the payload validates, the response is always 200: if generation
/// fails, the envelope carries the configured fallback message instead.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body = crate::models::WebhookRequest,
    responses(
        (status = 200, description = "Reply wrapped in the platform's fulfillment envelope", body = Fulfillment),
        (status = 400, description = "Malformed payload or missing utterance", body = ErrorResponse),
        (status = 413, description = "Body larger than the webhook limit", body = ErrorResponse)
    )
)]
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Fulfillment>, ApiError> {
    let body = body?;
    let reply = state.call_handler.handle(&body).await?;

    if reply.source == ReplySource::Fallback {
        warn!(
            platform = %state.call_handler.platform(),
            "Responding with fallback reply"
        );
    }

    Ok(Json(reply.fulfillment))
}

/// Heartbeat endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

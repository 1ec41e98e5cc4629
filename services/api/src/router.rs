//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the webhook endpoint, the health check, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        DialogflowWebhookRequest, ErrorResponse, HealthResponse, QueryResult,
        SessionWebhookRequest, WebhookRequest,
    },
    state::AppState,
};
use responder_core::fulfillment::{
    DialogflowFulfillment, Fulfillment, FulfillmentResponse, MessageText, ResponseMessage,
    SessionFulfillment,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::handle_webhook, handlers::health),
    components(
        schemas(
            WebhookRequest, DialogflowWebhookRequest, QueryResult, SessionWebhookRequest,
            Fulfillment, DialogflowFulfillment, FulfillmentResponse, ResponseMessage, MessageText,
            SessionFulfillment, ErrorResponse, HealthResponse
        )
    ),
    tags(
        (name = "Phone Responder API", description = "Conversational telephony webhook backed by a text-generation model")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The webhook is served at both the root (function-style deployments)
    // and an explicit path.
    let api_router = Router::new()
        .route("/", post(handlers::handle_webhook))
        .route("/webhook", post(handlers::handle_webhook))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(handlers::MAX_WEBHOOK_BODY_BYTES))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

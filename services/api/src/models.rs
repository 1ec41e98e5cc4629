//! API Models
//!
//! Request and response bodies of the webhook, used for OpenAPI documentation
//! with `utoipa`. The handler itself reads the raw body so that malformed
//! payloads get the documented error response.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A Dialogflow webhook request.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct DialogflowWebhookRequest {
    #[serde(rename = "queryResult")]
    pub query_result: QueryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "projects/my-agent/agent/sessions/abc123")]
    pub session: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct QueryResult {
    #[serde(rename = "queryText")]
    #[schema(example = "What time is it?")]
    pub query_text: String,
}

/// A flat session webhook request.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionWebhookRequest {
    #[schema(example = "What time is it?")]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "call-42")]
    pub session_id: Option<String>,
}

/// The webhook body accepted by the configured platform.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(untagged)]
pub enum WebhookRequest {
    Dialogflow(DialogflowWebhookRequest),
    Session(SessionWebhookRequest),
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    #[schema(example = "Invalid request")]
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
}

//! Utterance Extraction
//!
//! Turns a raw webhook body into an [`InboundQuery`]. Validation failures are
//! reported as [`RequestError`] and never reach the generation backend.

use crate::platform::Platform;
use serde_json::Value;
use tracing::{error, info, warn};

/// Session id used when a session webhook omits `session_id`.
pub const DEFAULT_SESSION_ID: &str = "default-session";

/// The caller's utterance, validated and ready for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundQuery {
    /// Never empty.
    pub text: String,
    pub session_id: Option<String>,
}

/// Reasons an inbound payload is rejected before generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The body is absent, is not JSON, or is not a non-empty JSON object.
    #[error("Invalid request")]
    MalformedRequest,
    /// The utterance field is missing, not a string, or empty.
    #[error("{}", .0.empty_utterance_message())]
    EmptyUtterance(Platform),
}

/// Extracts the utterance (and session id, where the platform has one) from
/// a raw request body.
pub fn extract_query(platform: Platform, body: &[u8]) -> Result<InboundQuery, RequestError> {
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Value::Object(map),
        _ => {
            error!(%platform, "Invalid request: no JSON object received");
            return Err(RequestError::MalformedRequest);
        }
    };

    let (text, session_id) = match platform {
        Platform::Dialogflow => (
            string_at(&payload, "/queryResult/queryText"),
            string_at(&payload, "/session").map(str::to_string),
        ),
        Platform::Session => (
            string_at(&payload, "/input"),
            Some(
                string_at(&payload, "/session_id")
                    .filter(|id| !id.is_empty())
                    .unwrap_or(DEFAULT_SESSION_ID)
                    .to_string(),
            ),
        ),
    };

    let text = text.unwrap_or_default();
    info!(%platform, query_text = %text, "Extracted utterance from webhook payload");

    if text.is_empty() {
        warn!(%platform, "No utterance found in request");
        return Err(RequestError::EmptyUtterance(platform));
    }

    Ok(InboundQuery {
        text: text.to_string(),
        session_id,
    })
}

fn string_at<'a>(payload: &'a Value, pointer: &str) -> Option<&'a str> {
    payload.pointer(pointer).and_then(Value::as_str)
}

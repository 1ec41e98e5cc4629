//! Fulfillment Envelopes
//!
//! Typed response envelopes for each [`Platform`]. Building one never fails:
//! any reply string produces a well-formed envelope.

use crate::platform::Platform;
use crate::query::DEFAULT_SESSION_ID;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The response body returned to the calling platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Fulfillment {
    Dialogflow(DialogflowFulfillment),
    Session(SessionFulfillment),
}

impl Fulfillment {
    /// The reply text carried by the envelope.
    pub fn text(&self) -> &str {
        match self {
            Fulfillment::Dialogflow(envelope) => envelope
                .fulfillment_response
                .messages
                .first()
                .and_then(|message| message.text.text.first())
                .map(String::as_str)
                .unwrap_or_default(),
            Fulfillment::Session(envelope) => &envelope.response,
        }
    }
}

/// `{"fulfillment_response": {"messages": [{"text": {"text": ["..."]}}]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DialogflowFulfillment {
    pub fulfillment_response: FulfillmentResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FulfillmentResponse {
    pub messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResponseMessage {
    pub text: MessageText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageText {
    #[schema(example = json!(["It's 3 PM."]))]
    pub text: Vec<String>,
}

/// `{"response": "...", "session_id": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionFulfillment {
    #[schema(example = "It's 3 PM.")]
    pub response: String,
    #[schema(example = "call-42")]
    pub session_id: String,
}

/// Wraps `text` in the envelope `platform` expects.
///
/// `session_id` is echoed back by the session platform and ignored by
/// Dialogflow; a missing id falls back to [`DEFAULT_SESSION_ID`].
pub fn build_fulfillment(platform: Platform, text: &str, session_id: Option<&str>) -> Fulfillment {
    match platform {
        Platform::Dialogflow => Fulfillment::Dialogflow(DialogflowFulfillment {
            fulfillment_response: FulfillmentResponse {
                messages: vec![ResponseMessage {
                    text: MessageText {
                        text: vec![text.to_string()],
                    },
                }],
            },
        }),
        Platform::Session => Fulfillment::Session(SessionFulfillment {
            response: text.to_string(),
            session_id: session_id.unwrap_or(DEFAULT_SESSION_ID).to_string(),
        }),
    }
}

use std::fmt;
use std::str::FromStr;

/// The conversational platform calling the webhook.
///
/// A platform fixes both where the utterance lives in the inbound payload and
/// the shape of the envelope sent back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Dialogflow webhook: `queryResult.queryText` in, `fulfillment_response` out.
    Dialogflow,
    /// Flat session webhook: `input` / `session_id` in, `response` / `session_id` out.
    Session,
}

impl Platform {
    /// The error message returned when the utterance is missing or blank.
    pub fn empty_utterance_message(&self) -> &'static str {
        match self {
            Platform::Dialogflow => "No query_text provided",
            Platform::Session => "No input provided",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Dialogflow => write!(f, "dialogflow"),
            Platform::Session => write!(f, "session"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dialogflow" => Ok(Platform::Dialogflow),
            "session" => Ok(Platform::Session),
            other => Err(format!(
                "'{}' is not a supported platform (expected 'dialogflow' or 'session')",
                other
            )),
        }
    }
}

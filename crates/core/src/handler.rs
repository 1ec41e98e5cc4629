//! Call Handler
//!
//! The request pipeline: extract the utterance, generate a reply under a
//! bounded timeout, and wrap it in the platform's envelope. Generation
//! failures never escape; they are replaced by a fixed, caller-safe message.

use crate::{
    fulfillment::{Fulfillment, build_fulfillment},
    llm_client::{GenerationError, TextGenerator},
    platform::Platform,
    query::{RequestError, extract_query},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Spoken back to the caller whenever generation fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I'm sorry, I'm having trouble processing your request right now.";

/// Upper bound on a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Which path produced the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    Fallback,
}

/// The outcome of a handled call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub fulfillment: Fulfillment,
    pub source: ReplySource,
}

/// Stateless webhook pipeline shared by every request.
pub struct CallHandler {
    generator: Arc<dyn TextGenerator>,
    platform: Platform,
    fallback_message: String,
    timeout: Duration,
}

impl CallHandler {
    /// Creates a handler with the default fallback message and timeout.
    pub fn new(generator: Arc<dyn TextGenerator>, platform: Platform) -> Self {
        Self {
            generator,
            platform,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Replaces the fallback message. Blank messages are ignored so the
    /// envelope always carries text.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.fallback_message = message;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Runs the full pipeline over a raw request body.
    ///
    /// Returns `Err` only for payloads rejected by validation; once the
    /// utterance is accepted a reply is always produced.
    pub async fn handle(&self, body: &[u8]) -> Result<Reply, RequestError> {
        let query = extract_query(self.platform, body)?;

        let (text, source) = match self.generate_reply(&query.text).await {
            Ok(text) => {
                info!(platform = %self.platform, response = %text, "Generated reply");
                (text, ReplySource::Generated)
            }
            Err(err) => {
                error!(platform = %self.platform, error = %err, "Generation failed, using fallback reply");
                (self.fallback_message.clone(), ReplySource::Fallback)
            }
        };

        Ok(Reply {
            fulfillment: build_fulfillment(self.platform, &text, query.session_id.as_deref()),
            source,
        })
    }

    /// Makes exactly one generation attempt, bounded by the configured timeout.
    pub async fn generate_reply(&self, utterance: &str) -> Result<String, GenerationError> {
        tokio::time::timeout(self.timeout, self.generator.generate(utterance))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))?
    }
}

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

/// OpenAI-compatible endpoint of Google AI Studio, authenticated with an API key.
pub const AI_STUDIO_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Builds the OpenAI-compatible endpoint of Vertex AI for a project and region.
pub fn vertex_api_base(project: &str, region: &str) -> String {
    format!(
        "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/endpoints/openapi"
    )
}

/// Why a generation call produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation backend request failed: {0}")]
    Backend(String),
    #[error("generation backend returned no text")]
    EmptyResponse,
    #[error("generation backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("generation backend is misconfigured: {0}")]
    Configuration(String),
}

impl From<OpenAIError> for GenerationError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::InvalidArgument(detail) => GenerationError::Configuration(detail),
            other => GenerationError::Backend(other.to_string()),
        }
    }
}

/// A backend that turns a single prompt into a single text reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Makes one non-streaming generation call and returns the model's text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// A `TextGenerator` for any OpenAI-compatible chat-completion API.
pub struct OpenAICompatibleGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: Option<String>,
}

impl OpenAICompatibleGenerator {
    /// Creates a generator for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The client configuration, including credential and base URL.
    /// * `model` - The model identifier to request (e.g., "gemini-2.0-flash-exp").
    ///
    /// The client never retries: a rate-limited or failed request is reported
    /// to the caller after exactly one attempt.
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config).with_backoff(single_attempt()),
            model,
            system_prompt: None,
        }
    }

    /// Sends `system_prompt` as a system message ahead of every utterance.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|prompt| !prompt.trim().is_empty());
        self
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt.as_str())
                    .build()?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
    }
}

// An elapsed-time budget of zero turns every transient error permanent.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[async_trait]
impl TextGenerator for OpenAICompatibleGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = self.build_request(prompt)?;
        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        handler::{CallHandler, ReplySource},
        platform::Platform,
    };
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Instant;

    /// Serves `body` with `status` for every chat-completion request and
    /// counts how many requests arrived.
    async fn spawn_backend(status: StatusCode, body: Value) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                let body = body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1", addr), hits)
    }

    fn generator_for(api_base: &str) -> OpenAICompatibleGenerator {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(api_base);
        OpenAICompatibleGenerator::new(config, "gemini-2.0-flash-exp".to_string())
    }

    fn completion(choices: Value) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gemini-2.0-flash-exp",
            "choices": choices
        })
    }

    fn api_error(kind: &str) -> Value {
        json!({"error": {"message": "backend unavailable", "type": kind, "param": null, "code": null}})
    }

    #[tokio::test]
    async fn test_generate_returns_reply_verbatim() {
        let (api_base, hits) = spawn_backend(
            StatusCode::OK,
            completion(json!([{
                "index": 0,
                "message": {"role": "assistant", "content": "  It's 3 PM.\n"},
                "finish_reason": "stop"
            }])),
        )
        .await;

        let text = generator_for(&api_base)
            .generate("What time is it?")
            .await
            .unwrap();

        assert_eq!(text, "  It's 3 PM.\n");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_without_choices_is_empty_response() {
        let (api_base, _) = spawn_backend(StatusCode::OK, completion(json!([]))).await;

        let err = generator_for(&api_base).generate("Hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_with_null_content_is_empty_response() {
        let (api_base, _) = spawn_backend(
            StatusCode::OK,
            completion(json!([{
                "index": 0,
                "message": {"role": "assistant", "content": null},
                "finish_reason": "stop"
            }])),
        )
        .await;

        let err = generator_for(&api_base).generate("Hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_generate_unauthorized_is_backend_error() {
        let (api_base, hits) =
            spawn_backend(StatusCode::UNAUTHORIZED, api_error("invalid_request_error")).await;

        let err = generator_for(&api_base).generate("Hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Backend(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (api_base, hits) =
            spawn_backend(StatusCode::TOO_MANY_REQUESTS, api_error("rate_limit_exceeded")).await;

        let err = generator_for(&api_base).generate("Hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Backend(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_backend_falls_back_after_one_attempt() {
        let (api_base, hits) =
            spawn_backend(StatusCode::SERVICE_UNAVAILABLE, api_error("server_error")).await;
        let timeout = Duration::from_secs(10);
        let handler = CallHandler::new(Arc::new(generator_for(&api_base)), Platform::Dialogflow)
            .with_timeout(timeout);

        let started = Instant::now();
        let reply = handler
            .handle(br#"{"queryResult": {"queryText": "Hello"}}"#)
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < timeout);
    }

    fn generator() -> OpenAICompatibleGenerator {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(AI_STUDIO_API_BASE);
        OpenAICompatibleGenerator::new(config, "gemini-2.0-flash-exp".to_string())
    }

    #[test]
    fn test_request_carries_model_and_utterance() {
        let request = generator().build_request("What time is it?").unwrap();
        assert_eq!(request.model, "gemini-2.0-flash-exp");
        assert_eq!(request.messages.len(), 1);
        assert!(matches!(
            request.messages[0],
            ChatCompletionRequestMessage::User(_)
        ));
        assert_ne!(request.stream, Some(true));
    }

    #[test]
    fn test_system_prompt_is_sent_first() {
        let request = generator()
            .with_system_prompt(Some("Answer in one sentence.".to_string()))
            .build_request("Hi")
            .unwrap();
        assert_eq!(request.messages.len(), 2);
        assert!(matches!(
            request.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            request.messages[1],
            ChatCompletionRequestMessage::User(_)
        ));
    }

    #[test]
    fn test_blank_system_prompt_is_ignored() {
        let request = generator()
            .with_system_prompt(Some("  ".to_string()))
            .build_request("Hi")
            .unwrap();
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn test_vertex_api_base() {
        assert_eq!(
            vertex_api_base("my-project", "europe-west4"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/my-project/locations/europe-west4/endpoints/openapi"
        );
    }

    #[test]
    fn test_invalid_argument_maps_to_configuration() {
        let err: GenerationError = OpenAIError::InvalidArgument("no model".to_string()).into();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn test_generation_error_display() {
        assert_eq!(
            GenerationError::Timeout(Duration::from_secs(8)).to_string(),
            "generation backend did not answer within 8s"
        );
        assert_eq!(
            GenerationError::EmptyResponse.to_string(),
            "generation backend returned no text"
        );
    }
}

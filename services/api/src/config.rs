use responder_core::{
    handler::DEFAULT_FALLBACK_MESSAGE,
    llm_client::{AI_STUDIO_API_BASE, vertex_api_base},
    platform::Platform,
};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported text-generation backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Google AI Studio, authenticated with an API key.
    AiStudio,
    /// Vertex AI, addressed by project and region and authenticated with an access token.
    Vertex,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub platform: Platform,
    pub backend: Backend,
    pub google_api_key: Option<String>,
    pub gcp_project: Option<String>,
    pub gcp_region: String,
    pub vertex_access_token: Option<String>,
    pub chat_model: String,
    pub system_prompt: Option<String>,
    pub generation_timeout: Duration,
    pub fallback_message: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let platform = std::env::var("PLATFORM")
            .unwrap_or_else(|_| "dialogflow".to_string())
            .parse::<Platform>()
            .map_err(|e| ConfigError::InvalidValue("PLATFORM".to_string(), e))?;

        let backend_str =
            std::env::var("GENERATION_BACKEND").unwrap_or_else(|_| "ai-studio".to_string());
        let backend = match backend_str.to_lowercase().as_str() {
            "ai-studio" | "aistudio" | "gemini" => Backend::AiStudio,
            "vertex" | "vertex-ai" => Backend::Vertex,
            other => {
                return Err(ConfigError::InvalidValue(
                    "GENERATION_BACKEND".to_string(),
                    format!("'{}' is not one of 'ai-studio' or 'vertex'", other),
                ));
            }
        };

        let google_api_key = non_empty_var("GOOGLE_API_KEY");
        let gcp_project = non_empty_var("GOOGLE_CLOUD_PROJECT");
        let gcp_region =
            non_empty_var("GOOGLE_CLOUD_REGION").unwrap_or_else(|| "us-central1".to_string());
        let vertex_access_token = non_empty_var("VERTEX_ACCESS_TOKEN");

        let default_model = match backend {
            Backend::AiStudio => "gemini-2.0-flash-exp",
            Backend::Vertex => "google/gemini-2.0-flash",
        };
        let chat_model = non_empty_var("CHAT_MODEL").unwrap_or_else(|| default_model.to_string());

        let system_prompt = non_empty_var("SYSTEM_PROMPT");

        let timeout_str =
            std::env::var("GENERATION_TIMEOUT_SECS").unwrap_or_else(|_| "8".to_string());
        let generation_timeout = match timeout_str.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "GENERATION_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                ));
            }
        };

        let fallback_message = non_empty_var("FALLBACK_MESSAGE")
            .unwrap_or_else(|| DEFAULT_FALLBACK_MESSAGE.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        match backend {
            Backend::AiStudio => {
                if google_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GOOGLE_API_KEY must be set for 'ai-studio' backend".to_string(),
                    ));
                }
            }
            Backend::Vertex => {
                if gcp_project.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GOOGLE_CLOUD_PROJECT must be set for 'vertex' backend".to_string(),
                    ));
                }
                if vertex_access_token.is_none() {
                    return Err(ConfigError::MissingVar(
                        "VERTEX_ACCESS_TOKEN must be set for 'vertex' backend".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            bind_address,
            platform,
            backend,
            google_api_key,
            gcp_project,
            gcp_region,
            vertex_access_token,
            chat_model,
            system_prompt,
            generation_timeout,
            fallback_message,
            log_level,
        })
    }

    /// The OpenAI-compatible base URL of the selected backend.
    pub fn api_base(&self) -> String {
        match self.backend {
            Backend::AiStudio => AI_STUDIO_API_BASE.to_string(),
            Backend::Vertex => vertex_api_base(
                self.gcp_project.as_deref().unwrap_or_default(),
                &self.gcp_region,
            ),
        }
    }

    /// The bearer credential of the selected backend.
    pub fn credential(&self) -> Option<&str> {
        match self.backend {
            Backend::AiStudio => self.google_api_key.as_deref(),
            Backend::Vertex => self.vertex_access_token.as_deref(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

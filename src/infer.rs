use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::Config;
use crate::proxy::dto::ChatRequest;

mod error;
pub use error::InferError;
pub mod openai;
pub mod parsing;
pub mod text_generation;

pub use parsing::{ParseError, UpstreamReply};

/// Token cap sent with every upstream request.
pub const MAX_TOKENS: u32 = 200;
pub const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Groq's OpenAI-compatible chat completions.
    Groq,
    /// Hugging Face router, OpenAI-compatible chat completions.
    HuggingFace,
    /// Legacy Hugging Face text-generation inference.
    HuggingFaceInference,
}

/// How the conversation is shaped for the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StructuredMessages,
    TextConcatenation,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::HuggingFace | Self::HuggingFaceInference => "Hugging Face",
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Self::Groq | Self::HuggingFace => Strategy::StructuredMessages,
            Self::HuggingFaceInference => Strategy::TextConcatenation,
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::HuggingFace | Self::HuggingFaceInference => "HUGGINGFACE_API_KEY",
        }
    }

    /// Whether a caller may bring their own key when the deployment has none.
    pub fn accepts_request_key(self) -> bool {
        matches!(self, Self::HuggingFace)
    }

    pub(crate) fn missing_api_key_message(self) -> String {
        if self.accepts_request_key() {
            format!(
                "API Key not configured. Please set {} in the environment or provide apiKey in request.",
                self.api_key_var()
            )
        } else {
            format!(
                "API Key not configured. Please set {} in the environment.",
                self.api_key_var()
            )
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Upstream client shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl Client {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forwards `request` to `provider` and returns the normalized reply text.
    ///
    /// The credential is resolved before anything goes over the wire, so a
    /// missing key never costs a round-trip. Exactly one upstream call is
    /// made otherwise.
    pub async fn complete(
        &self,
        provider: Provider,
        request: &ChatRequest,
    ) -> Result<Box<str>, InferError> {
        let api_key = self
            .config
            .resolve_api_key(provider, request.api_key.as_deref())?;
        let upstream = self.config.upstream(provider);

        let body = match provider.strategy() {
            Strategy::StructuredMessages => {
                let payload = openai::ChatCompletionRequest::new(&upstream.model, request);
                let url = format!("{}/chat/completions", upstream.base_url);
                self.post_json(provider, &url, api_key, &payload).await?
            }
            Strategy::TextConcatenation => {
                let payload = text_generation::TextGenerationRequest::new(request);
                let url = format!("{}/models/{}", upstream.base_url, upstream.model);
                self.post_json(provider, &url, api_key, &payload).await?
            }
        };

        parsing::normalize_reply(&body, provider.strategy()).map_err(|source| {
            tracing::warn!(%provider, error = %source, body = %body, "Unusable upstream reply");
            InferError::InvalidResponse { provider, source }
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        provider: Provider,
        url: &str,
        api_key: &str,
        payload: &T,
    ) -> Result<String, InferError> {
        let request_failed = |source| InferError::RequestFailed { provider, source };

        tracing::debug!(%provider, url, "Sending upstream request");
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let text = response.text().await.map_err(request_failed)?;

        if !status.is_success() {
            let message = openai::error_detail(&text);
            tracing::warn!(%provider, %status, detail = %message, "Upstream rejected request");
            return Err(InferError::ErrorResponse {
                provider,
                status,
                message,
            });
        }

        Ok(text)
    }
}

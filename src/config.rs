use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::infer::{InferError, Provider};

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "meta-llama/Llama-3.2-3B-Instruct";
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_HUGGINGFACE_ROUTER_URL: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_HUGGINGFACE_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Credentials and endpoint for a single upstream.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<Box<str>>,
    pub model: Box<str>,
    pub base_url: Box<str>,
}

/// Process configuration, built once at startup and shared read-only by
/// every request.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub groq: UpstreamConfig,
    pub huggingface_router: UpstreamConfig,
    pub huggingface_inference: UpstreamConfig,
    pub upstream_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Empty
    /// values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| -> Option<Box<str>> {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(String::into_boxed_str)
        };
        let base_url = |name: &str, default: &str| -> Box<str> {
            var(name)
                .as_deref()
                .unwrap_or(default)
                .trim_end_matches('/')
                .into()
        };

        let port = match var("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {port}"))?,
            None => DEFAULT_PORT,
        };

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(
                secs.parse::<u64>()
                    .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS: {secs}"))?,
            )),
            None => None,
        };

        let huggingface_api_key = var(Provider::HuggingFace.api_key_var());
        let huggingface_model: Box<str> =
            var("HUGGINGFACE_MODEL").unwrap_or_else(|| DEFAULT_HUGGINGFACE_MODEL.into());

        Ok(Self {
            port,
            groq: UpstreamConfig {
                api_key: var(Provider::Groq.api_key_var()),
                model: var("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.into()),
                base_url: base_url("GROQ_API_URL", DEFAULT_GROQ_API_URL),
            },
            huggingface_router: UpstreamConfig {
                api_key: huggingface_api_key.clone(),
                model: huggingface_model.clone(),
                base_url: base_url("HUGGINGFACE_ROUTER_URL", DEFAULT_HUGGINGFACE_ROUTER_URL),
            },
            huggingface_inference: UpstreamConfig {
                api_key: huggingface_api_key,
                model: huggingface_model,
                base_url: base_url("HUGGINGFACE_INFERENCE_URL", DEFAULT_HUGGINGFACE_INFERENCE_URL),
            },
            upstream_timeout,
        })
    }

    pub fn upstream(&self, provider: Provider) -> &UpstreamConfig {
        match provider {
            Provider::Groq => &self.groq,
            Provider::HuggingFace => &self.huggingface_router,
            Provider::HuggingFaceInference => &self.huggingface_inference,
        }
    }

    /// Picks the bearer token for `provider`. The configured key always wins;
    /// a key supplied in the request body is only consulted by providers that
    /// accept one.
    pub fn resolve_api_key<'a>(
        &'a self,
        provider: Provider,
        request_key: Option<&'a str>,
    ) -> Result<&'a str, InferError> {
        if let Some(api_key) = self.upstream(provider).api_key.as_deref() {
            return Ok(api_key);
        }
        if provider.accepts_request_key()
            && let Some(api_key) = request_key.filter(|key| !key.is_empty())
        {
            return Ok(api_key);
        }
        Err(InferError::MissingApiKey(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(move |name| {
            vars.iter()
                .find(|(var, _)| var == name)
                .map(|(_, value)| value.clone())
        })
        .unwrap()
    }

    #[test]
    fn applies_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(&*config.groq.model, DEFAULT_GROQ_MODEL);
        assert_eq!(&*config.huggingface_router.model, DEFAULT_HUGGINGFACE_MODEL);
        assert_eq!(&*config.huggingface_inference.base_url, DEFAULT_HUGGINGFACE_INFERENCE_URL);
        assert!(config.groq.api_key.is_none());
        assert!(config.upstream_timeout.is_none());
    }

    #[test]
    fn shares_huggingface_key_and_model() {
        let config = config(&[
            ("HUGGINGFACE_API_KEY", "hf_secret"),
            ("HUGGINGFACE_MODEL", "Qwen/Qwen2.5-7B-Instruct"),
            ("HUGGINGFACE_ROUTER_URL", "http://localhost:9000/v1/"),
        ]);
        assert_eq!(config.huggingface_router.api_key.as_deref(), Some("hf_secret"));
        assert_eq!(config.huggingface_inference.api_key.as_deref(), Some("hf_secret"));
        assert_eq!(&*config.huggingface_inference.model, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(&*config.huggingface_router.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config(&[("GROQ_API_KEY", "  "), ("GROQ_MODEL", "")]);
        assert!(config.groq.api_key.is_none());
        assert_eq!(&*config.groq.model, DEFAULT_GROQ_MODEL);
    }

    #[test]
    fn rejects_invalid_numbers() {
        let result = Config::from_lookup(|name| (name == "PORT").then(|| "eighty".to_string()));
        assert!(result.unwrap_err().to_string().contains("Invalid PORT"));

        let result = Config::from_lookup(|name| {
            (name == "UPSTREAM_TIMEOUT_SECS").then(|| "-1".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn parses_timeout() {
        let config = config(&[("UPSTREAM_TIMEOUT_SECS", "30")]);
        assert_eq!(config.upstream_timeout, Some(Duration::from_secs(30)));
    }

    mod resolve_api_key {
        use super::*;

        #[test]
        fn prefers_configured_key() {
            let config = config(&[("HUGGINGFACE_API_KEY", "configured")]);
            let key = config.resolve_api_key(Provider::HuggingFace, Some("from-body"));
            assert_eq!(key.unwrap(), "configured");
        }

        #[test]
        fn falls_back_to_request_key_where_accepted() {
            let config = config(&[]);
            let key = config.resolve_api_key(Provider::HuggingFace, Some("from-body"));
            assert_eq!(key.unwrap(), "from-body");
        }

        #[test]
        fn ignores_request_key_elsewhere() {
            let config = config(&[]);
            for provider in [Provider::Groq, Provider::HuggingFaceInference] {
                let result = config.resolve_api_key(provider, Some("from-body"));
                assert!(matches!(result, Err(InferError::MissingApiKey(p)) if p == provider));
            }
        }

        #[test]
        fn missing_everywhere() {
            let config = config(&[]);
            let error = config.resolve_api_key(Provider::HuggingFace, Some("")).unwrap_err();
            let message = error.to_string();
            assert!(message.contains("HUGGINGFACE_API_KEY"));
            assert!(message.contains("apiKey"));
        }
    }
}

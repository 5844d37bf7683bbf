use http::StatusCode;
use thiserror::Error;

use super::Provider;
use super::parsing::ParseError;

#[derive(Error, Debug)]
pub enum InferError {
    #[error("{}", .0.missing_api_key_message())]
    MissingApiKey(Provider),

    #[error("{provider} API error: {message}")]
    ErrorResponse {
        provider: Provider,
        status: StatusCode,
        message: String,
    },

    #[error("Failed to reach {provider} API: {source}")]
    RequestFailed {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from {provider} API")]
    InvalidResponse {
        provider: Provider,
        #[source]
        source: ParseError,
    },
}

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::infer::InferError;

/// Every way a proxy request can fail, one variant per stage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid request: {0}")]
    BadRequest(Box<str>),
    #[error("{0}")]
    MissingConfiguration(Box<str>),
    #[error("{message}")]
    Upstream { status: StatusCode, message: Box<str> },
    #[error("{0}")]
    Unreachable(Box<str>),
    #[error("{0}")]
    InvalidResponse(Box<str>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Upstream { status, .. } => *status,
            Error::MissingConfiguration(_)
            | Error::Unreachable(_)
            | Error::InvalidResponse(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InferError> for Error {
    fn from(error: InferError) -> Self {
        let message = error.to_string().into_boxed_str();
        match error {
            InferError::MissingApiKey(_) => Error::MissingConfiguration(message),
            InferError::ErrorResponse { status, .. } => Error::Upstream { status, message },
            InferError::RequestFailed { .. } => Error::Unreachable(message),
            InferError::InvalidResponse { .. } => Error::InvalidResponse(message),
        }
    }
}

/// Body of every failed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpErrorBody {
    pub error: Box<str>,
}

impl From<&Error> for HttpErrorBody {
    fn from(error: &Error) -> Self {
        let message = error.to_string();
        Self {
            error: if message.is_empty() {
                "Internal server error".into()
            } else {
                message.into()
            },
        }
    }
}

#[cfg(feature = "server-http2")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Service error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, axum::Json(HttpErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::{ParseError, Provider};

    #[test]
    fn maps_statuses() {
        assert_eq!(Error::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Error::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::MissingConfiguration("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn forwards_upstream_status() {
        let error = Error::from(InferError::ErrorResponse {
            provider: Provider::Groq,
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Rate limit reached".into(),
        });
        assert_eq!(error.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.to_string(), "Groq API error: Rate limit reached");
    }

    #[test]
    fn classifies_infer_errors() {
        let error = Error::from(InferError::MissingApiKey(Provider::Groq));
        assert!(matches!(error, Error::MissingConfiguration(_)));

        let error = Error::from(InferError::InvalidResponse {
            provider: Provider::HuggingFace,
            source: ParseError::EmptyReply,
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "Invalid response from Hugging Face API");
    }

    #[test]
    fn error_body_is_never_empty() {
        let body = HttpErrorBody::from(&Error::Internal(anyhow::anyhow!("")));
        assert_eq!(&*body.error, "Internal server error");

        let body = HttpErrorBody::from(&Error::BadRequest("messages is required".into()));
        assert_eq!(&*body.error, "Invalid request: messages is required");
    }
}

use serde_json::Value;
use thiserror::Error;

use super::Strategy;
use super::text_generation;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unrecognized reply shape")]
    Unrecognized,

    #[error("Empty reply")]
    EmptyReply,
}

/// The reply shapes the upstreams are known to produce, in precedence order.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// `{"choices": [{"message": {"content": ...}}]}`
    ChatCompletion(Option<String>),
    /// `{"content": ...}`
    Content(String),
    /// `[{"generated_text": ...}]`
    GeneratedList(Option<String>),
    /// `{"generated_text": ...}`
    Generated(String),
    /// `"..."`
    Text(String),
    Unrecognized(Value),
}

impl From<Value> for UpstreamReply {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                if let Some(Value::Array(choices)) = map.get("choices")
                    && let Some(choice) = choices.first()
                {
                    return Self::ChatCompletion(
                        choice
                            .pointer("/message/content")
                            .and_then(Value::as_str)
                            .map(str::to_owned),
                    );
                }
                if let Some(content) = non_empty_str(map.get("content")) {
                    return Self::Content(content.to_owned());
                }
                if let Some(text) = non_empty_str(map.get("generated_text")) {
                    return Self::Generated(text.to_owned());
                }
                Self::Unrecognized(Value::Object(map))
            }
            Value::Array(items) => Self::GeneratedList(
                non_empty_str(items.first().and_then(|item| item.get("generated_text")))
                    .map(str::to_owned),
            ),
            Value::String(text) => Self::Text(text),
            other => Self::Unrecognized(other),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

impl UpstreamReply {
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        serde_json::from_str::<Value>(body)
            .map(Self::from)
            .map_err(ParseError::InvalidJson)
    }

    /// Generated text carried by the reply, untrimmed. A recognized shape
    /// with a missing field yields an empty string.
    pub fn into_text(self) -> Result<String, ParseError> {
        match self {
            Self::ChatCompletion(text) | Self::GeneratedList(text) => Ok(text.unwrap_or_default()),
            Self::Content(text) | Self::Generated(text) | Self::Text(text) => Ok(text),
            Self::Unrecognized(_) => Err(ParseError::Unrecognized),
        }
    }
}

/// Turns a successful upstream body into the text handed back to the caller.
///
/// Never returns an empty string.
pub fn normalize_reply(body: &str, strategy: Strategy) -> Result<Box<str>, ParseError> {
    let text = UpstreamReply::parse(body)?.into_text()?;
    let text = match strategy {
        Strategy::TextConcatenation => text_generation::strip_assistant_turns(&text),
        Strategy::StructuredMessages => text.as_str(),
    }
    .trim();

    if text.is_empty() {
        Err(ParseError::EmptyReply)
    } else {
        Ok(text.into())
    }
}

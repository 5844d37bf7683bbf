use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service;

/// One of the three roles every upstream accepts. Anything that is not
/// `system` or `user` is read as `assistant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Box<str>")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Box<str>> for MessageRole {
    fn from(role: Box<str>) -> Self {
        match &*role {
            "system" => Self::System,
            "user" => Self::User,
            _ => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Box<str>,
}

impl Message {
    pub fn system(content: impl Into<Box<str>>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<Box<str>>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<Box<str>>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Inbound body shared by every proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Box<str>>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: None,
            api_key: None,
        }
    }

    /// Decodes a raw request body. Every failure, malformed JSON included,
    /// is a bad request.
    pub fn from_slice(body: &[u8]) -> service::Result<Self> {
        let mut value: Value = serde_json::from_slice(body).map_err(|error| {
            service::Error::BadRequest(format!("malformed JSON body: {error}").into())
        })?;

        let messages = match value.get_mut("messages").map(Value::take) {
            Some(messages @ Value::Array(_)) => messages,
            _ => return Err(service::Error::BadRequest("messages is required".into())),
        };
        let messages: Vec<Message> = serde_json::from_value(messages).map_err(|error| {
            service::Error::BadRequest(
                format!("messages must be a list of {{role, content}} objects: {error}").into(),
            )
        })?;

        Ok(Self {
            messages,
            system_prompt: optional_text(&value, "systemPrompt")?,
            api_key: optional_text(&value, "apiKey")?,
        })
    }
}

fn optional_text(value: &Value, field: &str) -> service::Result<Option<Box<str>>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str().into())),
        Some(_) => Err(service::Error::BadRequest(
            format!("{field} must be a string").into(),
        )),
    }
}

/// Successful proxy reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Box<str>,
}

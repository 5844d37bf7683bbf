use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MAX_TOKENS, TEMPERATURE};
use crate::prompts;
use crate::proxy::dto::{ChatRequest, MessageRole};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAIMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenAIMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, request: &'a ChatRequest) -> Self {
        Self {
            model,
            messages: openai_messages(request),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// Converts the conversation into chat-completions messages with exactly one
/// leading system message.
///
/// A conversation that already opens with a system message keeps it, unless
/// the caller also sent `systemPrompt`, which then replaces its content.
/// Otherwise the system prompt (or the persona) is prepended.
pub fn openai_messages(request: &ChatRequest) -> Vec<OpenAIMessage<'_>> {
    let system_prompt = prompts::system_prompt(request);
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    let mut rest = request.messages.as_slice();

    match rest.split_first() {
        Some((first, tail)) if first.role == MessageRole::System => {
            let content = match request.system_prompt.as_deref() {
                Some(system_prompt) => system_prompt,
                None => &*first.content,
            };
            messages.push(OpenAIMessage {
                role: MessageRole::System.as_str(),
                content,
            });
            rest = tail;
        }
        _ => messages.push(OpenAIMessage {
            role: MessageRole::System.as_str(),
            content: system_prompt,
        }),
    }

    messages.extend(rest.iter().map(|message| OpenAIMessage {
        role: message.role.as_str(),
        content: &message.content,
    }));
    messages
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: Value,
}

/// Pulls a human-readable message out of an upstream error body.
///
/// Understands `{"error": {"message": ...}}` (OpenAI, Groq) and
/// `{"error": "..."}` (Hugging Face); any other body is returned verbatim.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<OpenAIError>(body) {
        Ok(OpenAIError { error: Value::String(message) }) if !message.is_empty() => message,
        Ok(OpenAIError { error }) => match error.get("message").and_then(Value::as_str) {
            Some(message) if !message.is_empty() => message.to_owned(),
            _ if error.is_null() => body.to_owned(),
            _ => error.to_string(),
        },
        Err(_) => body.to_owned(),
    }
}

use serde::Serialize;

use super::{MAX_TOKENS, TEMPERATURE};
use crate::prompts;
use crate::proxy::dto::{ChatRequest, Message, MessageRole};

/// Opens the assistant turn at the end of a flat prompt. Models that echo the
/// whole conversation repeat it in their output.
pub const ASSISTANT_MARKER: &str = "助手:";

#[derive(Debug, Serialize)]
pub struct TextGenerationRequest {
    pub inputs: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub return_full_text: bool,
}

impl TextGenerationRequest {
    pub fn new(request: &ChatRequest) -> Self {
        Self {
            inputs: render_prompt(prompts::system_prompt(request), &request.messages),
            parameters: GenerationParameters {
                max_new_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                return_full_text: false,
            },
        }
    }
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "系统",
        MessageRole::User => "用户",
        MessageRole::Assistant => "助手",
    }
}

pub fn render_prompt(system_prompt: &str, messages: &[Message]) -> String {
    let conversation = messages
        .iter()
        .map(|message| format!("{}: {}", role_label(message.role), message.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{system_prompt}\n\n{conversation}\n{ASSISTANT_MARKER}")
}

/// Keeps only the final assistant turn of generated text.
pub fn strip_assistant_turns(text: &str) -> &str {
    let text = match text.rsplit_once(ASSISTANT_MARKER) {
        Some((_, reply)) => reply.trim(),
        None => text,
    };
    match text.strip_prefix(ASSISTANT_MARKER) {
        Some(reply) => reply.trim_start(),
        None => text,
    }
}

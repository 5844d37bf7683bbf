use crate::proxy::dto::ChatRequest;

/// Persona used by every upstream when the caller sends no system prompt.
pub const PERSONA: &str = "你是一个温暖、贴心的情感陪伴助手。";

/// The system prompt in effect for `request`.
pub fn system_prompt(request: &ChatRequest) -> &str {
    request.system_prompt.as_deref().unwrap_or(PERSONA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::dto::Message;

    #[test]
    fn defaults_to_persona() {
        let request = ChatRequest::new(vec![Message::user("hi")]);
        assert_eq!(system_prompt(&request), PERSONA);
    }

    #[test]
    fn uses_caller_prompt() {
        let mut request = ChatRequest::new(vec![]);
        request.system_prompt = Some("Be brief.".into());
        assert_eq!(system_prompt(&request), "Be brief.");
    }
}

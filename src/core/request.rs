//! Shapes conversation history and generation settings into a chat
//! completion request body.

use crate::api::{ChatMessage, ChatRequest};
use crate::core::chat_stream::ChatError;
use crate::core::config::GenerationConfig;
use crate::core::message::{ConversationTurn, Role};

/// Build the request body for `turns` under `config`.
///
/// A non-empty system directive becomes the first message; otherwise no
/// system entry is added. Fails with [`ChatError::MissingCredential`] when no
/// credential is configured so callers can prompt for one instead of sending.
pub fn build_chat_request(
    turns: &[ConversationTurn],
    config: &GenerationConfig,
    stream: bool,
) -> Result<ChatRequest, ChatError> {
    if !config.has_credential() {
        return Err(ChatError::MissingCredential);
    }

    let directive = config
        .system_directive
        .as_deref()
        .filter(|directive| !directive.is_empty());

    let mut messages = Vec::with_capacity(turns.len() + usize::from(directive.is_some()));
    if let Some(directive) = directive {
        messages.push(ChatMessage {
            role: Role::System.as_str().to_string(),
            content: directive.to_string(),
        });
    }
    messages.extend(turns.iter().map(|turn| ChatMessage {
        role: turn.role().as_str().to_string(),
        content: turn.content().to_string(),
    }));

    Ok(ChatRequest {
        model: config.model_id.clone(),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_output_tokens,
        stream,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(directive: Option<&str>) -> GenerationConfig {
        GenerationConfig {
            credential: "sk-test".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_output_tokens: 512,
            system_directive: directive.map(str::to_string),
        }
    }

    fn history() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user("Hello"),
            ConversationTurn::assistant("Hi there!"),
            ConversationTurn::user("How are you?"),
        ]
    }

    #[test]
    fn rejects_missing_credential() {
        let mut cfg = config(None);
        cfg.credential = "  ".to_string();
        assert_eq!(
            build_chat_request(&history(), &cfg, true),
            Err(ChatError::MissingCredential)
        );
    }

    #[test]
    fn omits_system_entry_without_directive() {
        for directive in [None, Some("")] {
            let request = build_chat_request(&history(), &config(directive), true).unwrap();
            assert!(request.messages.iter().all(|m| m.role != "system"));
            assert_eq!(request.messages.len(), 3);
        }
    }

    #[test]
    fn prepends_directive_as_system_entry() {
        let request = build_chat_request(&history(), &config(Some("Be brief.")), false).unwrap();
        assert_eq!(
            request.messages[0],
            ChatMessage {
                role: "system".to_string(),
                content: "Be brief.".to_string(),
            }
        );
        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
    }

    #[test]
    fn copies_parameters_and_stream_flag() {
        let request = build_chat_request(&history(), &config(None), true).unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.max_tokens, 512);
        assert!(request.stream);

        let request = build_chat_request(&history(), &config(None), false).unwrap();
        assert!(!request.stream);
    }

    #[test]
    fn serializes_to_wire_schema() {
        let turns = vec![ConversationTurn::user("Hi")];
        let request = build_chat_request(&turns, &config(Some("sys")), true).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "Hi"}
                ],
                "temperature": 0.5,
                "max_tokens": 512,
                "stream": true
            })
        );
    }

    #[test]
    fn identical_inputs_build_identical_requests() {
        let turns = history();
        let cfg = config(Some("sys"));
        assert_eq!(
            build_chat_request(&turns, &cfg, true),
            build_chat_request(&turns, &cfg, true)
        );
    }
}

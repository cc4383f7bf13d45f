use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use super::provider::ProviderKind;
use crate::Error;

/// One provider invocation: an ordered conversation plus generation options.
///
/// This is the request unit for both the batch and the stream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelChat {
    pub provider: ProviderKind,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelChat {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            messages: Vec::new(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a user message.
    pub fn with_user(self, content: impl Into<super::message::MessageContent>) -> Self {
        self.with_message(ChatMessage::user(content))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Client-input validation for batch elements. A missing model is
    /// rejected here, before any provider is contacted.
    pub fn validate(&self) -> Result<(), Error> {
        if self.model.is_empty() {
            return Err(Error::invalid_request("model is required"));
        }
        Ok(())
    }

    /// Client-input validation for stream requests: messages and model must
    /// both be present before streaming starts.
    pub fn validate_stream(&self) -> Result<(), Error> {
        if self.messages.is_empty() {
            return Err(Error::invalid_request("messages are required"));
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let chat = ModelChat::new(ProviderKind::OpenAi, "gpt-4o-mini")
            .with_user("Hi")
            .with_temperature(0.7)
            .with_max_tokens(1000);

        let json = serde_json::to_string(&chat).unwrap();
        assert!(json.contains(r#""provider":"openai""#));
        assert!(json.contains(r#""maxTokens":1000"#));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn test_missing_model_fails_validation() {
        let json = r#"{"provider":"openai","messages":[{"role":"user","content":"Hi"}]}"#;
        let chat: ModelChat = serde_json::from_str(json).unwrap();
        assert!(matches!(
            chat.validate(),
            Err(Error::InvalidRequest(ref msg)) if msg.contains("model")
        ));
    }

    #[test]
    fn test_missing_messages_fails_stream_validation() {
        let chat = ModelChat::new(ProviderKind::Gemini, "gemini-1.5-flash");
        assert!(matches!(
            chat.validate_stream(),
            Err(Error::InvalidRequest(ref msg)) if msg.contains("messages")
        ));

        let chat = chat.with_user("Hi");
        assert!(chat.validate_stream().is_ok());
    }
}

use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;

/// Outcome of one batch element. Untagged on the wire: a success record
/// carries `text`, an error record carries `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResult {
    Success {
        provider: ProviderKind,
        text: String,
        #[serde(rename = "elapsedMs")]
        elapsed_ms: u64,
    },
    Error {
        provider: ProviderKind,
        error: String,
        #[serde(rename = "elapsedMs")]
        elapsed_ms: u64,
    },
}

impl ChatResult {
    pub fn success(provider: ProviderKind, text: impl Into<String>, elapsed_ms: u64) -> Self {
        ChatResult::Success {
            provider,
            text: text.into(),
            elapsed_ms,
        }
    }

    pub fn failure(provider: ProviderKind, error: impl Into<String>, elapsed_ms: u64) -> Self {
        ChatResult::Error {
            provider,
            error: error.into(),
            elapsed_ms,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            ChatResult::Success { provider, .. } | ChatResult::Error { provider, .. } => *provider,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            ChatResult::Success { elapsed_ms, .. } | ChatResult::Error { elapsed_ms, .. } => {
                *elapsed_ms
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChatResult::Success { .. })
    }

    /// Response text, if this element succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            ChatResult::Success { text, .. } => Some(text),
            ChatResult::Error { .. } => None,
        }
    }

    /// Error message, if this element failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            ChatResult::Error { error, .. } => Some(error),
            ChatResult::Success { .. } => None,
        }
    }
}

/// Response envelope for the batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBatchResponse {
    pub data: Vec<ChatResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wire_shape() {
        let result = ChatResult::success(ProviderKind::OpenAi, "Hello", 12);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"provider":"openai","text":"Hello","elapsedMs":12}"#
        );
    }

    #[test]
    fn test_error_wire_shape() {
        let result = ChatResult::failure(ProviderKind::Gemini, "Missing Gemini API key", 3);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"provider":"gemini","error":"Missing Gemini API key","elapsedMs":3}"#
        );
    }

    #[test]
    fn test_untagged_deserialization() {
        let success: ChatResult =
            serde_json::from_str(r#"{"provider":"openai","text":"Hi","elapsedMs":5}"#).unwrap();
        assert!(success.is_success());
        assert_eq!(success.text(), Some("Hi"));

        let failure: ChatResult =
            serde_json::from_str(r#"{"provider":"deepseek","error":"boom","elapsedMs":5}"#)
                .unwrap();
        assert!(!failure.is_success());
        assert_eq!(failure.error(), Some("boom"));
    }
}

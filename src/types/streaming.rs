//! Wire events for streamed chat responses.

use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;

/// Literal end-of-stream marker sent after the terminal event. Distinct from
/// any data event and never parsed as one.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Events emitted over a chat stream, tagged by `type` on the wire.
///
/// Content events may repeat; exactly one terminal event (done xor error)
/// ends every stream, always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// A fragment of generated text.
    Content {
        provider: ProviderKind,
        content: String,
    },
    /// The provider finished cleanly.
    Done {
        provider: ProviderKind,
        #[serde(rename = "elapsedMs")]
        elapsed_ms: u64,
    },
    /// The stream failed; no Done follows.
    Error {
        provider: ProviderKind,
        error: String,
    },
}

impl StreamEvent {
    pub fn content(provider: ProviderKind, fragment: impl Into<String>) -> Self {
        StreamEvent::Content {
            provider,
            content: fragment.into(),
        }
    }

    pub fn done(provider: ProviderKind, elapsed_ms: u64) -> Self {
        StreamEvent::Done {
            provider,
            elapsed_ms,
        }
    }

    pub fn error(provider: ProviderKind, error: impl Into<String>) -> Self {
        StreamEvent::Error {
            provider,
            error: error.into(),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            StreamEvent::Content { provider, .. }
            | StreamEvent::Done { provider, .. }
            | StreamEvent::Error { provider, .. } => *provider,
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_wire_shape() {
        let event = StreamEvent::content(ProviderKind::OpenAi, "Hel");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"content","provider":"openai","content":"Hel"}"#
        );
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_done_wire_shape() {
        let event = StreamEvent::done(ProviderKind::Gemini, 1500);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"done","provider":"gemini","elapsedMs":1500}"#);
        assert!(event.is_terminal());
    }

    #[test]
    fn test_error_wire_shape() {
        let event = StreamEvent::error(ProviderKind::DeepSeek, "API Error");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"error","provider":"deepseek","error":"API Error"}"#
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn test_tagged_deserialization() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"content","provider":"openai","content":"Hi"}"#)
                .unwrap();
        assert_eq!(event, StreamEvent::content(ProviderKind::OpenAi, "Hi"));

        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"done","provider":"openai","elapsedMs":10}"#).unwrap();
        assert_eq!(event, StreamEvent::done(ProviderKind::OpenAi, 10));
    }
}

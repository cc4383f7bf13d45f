//! Per-conversation-slot state: the transcript plus the single in-flight
//! stream flag.

use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::accumulator::MessageAccumulator;
use crate::catalog;
use crate::client::StreamClient;
use crate::types::{ModelChat, ProviderKind, Role};

/// One transcript entry. `error` marks entries that carry a failure message
/// instead of generated content.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub elapsed_ms: Option<u64>,
    pub error: bool,
}

impl TranscriptMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            elapsed_ms: None,
            error: false,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<TranscriptMessage>,
    streaming: bool,
}

/// A conversation slot against one provider.
///
/// At most one stream may be in flight per slot; starting a second while one
/// is active is a no-op, not a queued retry. The flag is the slot's only
/// shared mutable state and is owned exclusively by this type.
#[derive(Clone)]
pub struct ChatSession {
    provider: ProviderKind,
    model: String,
    state: Arc<Mutex<SessionState>>,
}

/// Clears the streaming flag when the stream finishes or is dropped
/// mid-flight.
struct StreamingGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for StreamingGuard {
    fn drop(&mut self) {
        lock(&self.state).streaming = false;
    }
}

fn lock(state: &Arc<Mutex<SessionState>>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChatSession {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Create a session on the provider's default catalog model.
    pub fn with_default_model(provider: ProviderKind) -> Self {
        let model = catalog::default_model(provider).unwrap_or_default();
        Self::new(provider, model)
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Vec<TranscriptMessage> {
        lock(&self.state).messages.clone()
    }

    pub fn is_streaming(&self) -> bool {
        lock(&self.state).streaming
    }

    /// Send a prompt and stream the reply into the transcript.
    ///
    /// Returns the finished assistant message, or `None` when a stream is
    /// already active for this slot — the request is ignored and the
    /// provider is not contacted.
    pub async fn send_stream(
        &self,
        client: &StreamClient,
        prompt: &str,
    ) -> Option<TranscriptMessage> {
        {
            let mut state = lock(&self.state);
            if state.streaming {
                return None;
            }
            state.streaming = true;
            state.messages.push(TranscriptMessage::new(Role::User, prompt));
        }
        let _guard = StreamingGuard {
            state: self.state.clone(),
        };

        let request = ModelChat::new(self.provider, self.model.clone()).with_user(prompt);

        let mut accumulator = MessageAccumulator::new();
        let outcome = client
            .consume(&request, |event| accumulator.apply(&event))
            .await;

        let mut message = TranscriptMessage::new(Role::Assistant, "");
        match outcome {
            Ok(()) => {
                if let Some(error) = accumulator.error() {
                    message.content = format!("Error: {error}");
                    message.error = true;
                } else {
                    message.content = accumulator.text().to_string();
                    message.elapsed_ms = accumulator.elapsed_ms();
                }
            }
            Err(e) => {
                message.content = format!("Error: {e}");
                message.error = true;
            }
        }

        lock(&self.state).messages.push(message.clone());
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = ChatSession::new(ProviderKind::OpenAi, "gpt-4o-mini");
        assert!(!session.is_streaming());
        assert!(session.messages().is_empty());
        assert_eq!(session.provider(), ProviderKind::OpenAi);
    }

    #[test]
    fn test_default_model_comes_from_the_catalog() {
        let session = ChatSession::with_default_model(ProviderKind::DeepSeek);
        assert_eq!(session.model(), "deepseek-chat");
    }

    #[test]
    fn test_streaming_guard_clears_flag_on_drop() {
        let session = ChatSession::new(ProviderKind::OpenAi, "gpt-4o-mini");
        lock(&session.state).streaming = true;

        drop(StreamingGuard {
            state: session.state.clone(),
        });
        assert!(!session.is_streaming());
    }

    #[tokio::test]
    async fn test_second_start_while_active_is_a_noop() {
        let session = ChatSession::new(ProviderKind::OpenAi, "gpt-4o-mini");
        lock(&session.state).streaming = true;

        // Unroutable port: if the guard failed, consume would be attempted
        // and produce an error message rather than None.
        let client = StreamClient::new("http://127.0.0.1:9");
        let result = session.send_stream(&client, "Hello").await;

        assert!(result.is_none());
        assert!(session.messages().is_empty());
    }
}

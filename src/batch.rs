//! Concurrent fan-out of independent chat requests.

use futures::future::join_all;
use std::time::Instant;
use tracing::debug;

use crate::registry::ProviderRegistry;
use crate::types::{ChatResult, ModelChat};

/// Run one chat request, folding registry and provider failures into the
/// error variant. Nothing raises past this boundary.
pub async fn run_chat(registry: &ProviderRegistry, request: &ModelChat) -> ChatResult {
    let provider = request.provider;
    let start = Instant::now();

    let outcome = match registry.resolve(provider) {
        Ok(client) => client.chat(request).await,
        Err(e) => Err(e),
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(text) => ChatResult::success(provider, text, elapsed_ms),
        Err(e) => {
            debug!(%provider, error = %e, "chat request failed");
            ChatResult::failure(provider, e.to_string(), elapsed_ms)
        }
    }
}

/// Fan out a batch of requests concurrently. The output has the same length
/// and order as the input; one element's failure never affects its siblings.
pub async fn run_batch(registry: &ProviderRegistry, requests: &[ModelChat]) -> Vec<ChatResult> {
    join_all(requests.iter().map(|request| run_chat(registry, request))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatProvider, ChunkStream, StreamChunk};
    use crate::registry::ProviderSettings;
    use crate::types::{ProviderKind, ProviderModel};
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test double that replies with a fixed outcome and counts calls.
    #[derive(Debug)]
    struct MockProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChatProvider for MockProvider {
        async fn chat(&self, _request: &ModelChat) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .map_err(|message| Error::provider("mock", message))
        }

        async fn stream_chat(&self, _request: &ModelChat) -> Result<ChunkStream, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply.clone() {
                Ok(text) => Ok(Box::pin(futures_util::stream::iter(vec![Ok(
                    StreamChunk::new(text),
                )]))),
                Err(message) => Err(Error::provider("mock", message)),
            }
        }

        fn models(&self) -> Vec<ProviderModel> {
            Vec::new()
        }
    }

    fn request(provider: ProviderKind) -> ModelChat {
        ModelChat::new(provider, "test-model").with_user("Hi")
    }

    #[tokio::test]
    async fn test_single_success() {
        let mock = MockProvider::replying("Hello");
        let registry =
            ProviderRegistry::new(ProviderSettings::default()).with_provider(ProviderKind::OpenAi, mock);

        let results = run_batch(&registry, &[request(ProviderKind::OpenAi)]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider(), ProviderKind::OpenAi);
        assert_eq!(results[0].text(), Some("Hello"));
        assert!(results[0].elapsed_ms() < 60_000);
    }

    #[tokio::test]
    async fn test_empty_batch_contacts_nothing() {
        let mock = MockProvider::replying("unused");
        let registry = ProviderRegistry::new(ProviderSettings::default())
            .with_provider(ProviderKind::OpenAi, mock.clone());

        let results = run_batch(&registry, &[]).await;
        assert!(results.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_siblings() {
        let good = MockProvider::replying("fine");
        let bad = MockProvider::failing("vendor exploded");
        let registry = ProviderRegistry::new(ProviderSettings::default())
            .with_provider(ProviderKind::OpenAi, good)
            .with_provider(ProviderKind::Gemini, bad);

        let requests = [
            request(ProviderKind::OpenAi),
            request(ProviderKind::Gemini),
            request(ProviderKind::OpenAi),
        ];
        let results = run_batch(&registry, &requests).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].text(), Some("fine"));
        assert!(results[1].error().unwrap().contains("vendor exploded"));
        assert_eq!(results[2].text(), Some("fine"));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_becomes_error_result() {
        let registry = ProviderRegistry::new(ProviderSettings::default());

        let results = run_batch(&registry, &[request(ProviderKind::DeepSeek)]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].error().unwrap().contains("DeepSeek"));
    }
}

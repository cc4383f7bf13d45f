use futures_util::Stream;
use std::pin::Pin;

use crate::types::{ModelChat, ProviderModel};
use crate::Error;

/// One incremental piece of generated text from a streaming call.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub content: String,
}

impl StreamChunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A lazy, cancellable sequence of chunks. Dropping it stops consumption and
/// releases the underlying transport.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, Error>> + Send>>;

/// Capability contract implemented by every vendor binding. The adapter
/// layers depend only on this trait, never on concrete vendor types.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Run a single-shot chat completion and return the full response text.
    async fn chat(&self, request: &ModelChat) -> Result<String, Error>;

    /// Open a streaming chat completion.
    async fn stream_chat(&self, request: &ModelChat) -> Result<ChunkStream, Error>;

    /// The static model catalog for this provider.
    fn models(&self) -> Vec<ProviderModel>;
}

//! DeepSeek binding. The API is OpenAI-compatible, so this wraps the
//! chat-completions client with DeepSeek's endpoint and catalog.

use super::openai::OpenAiProvider;
use crate::provider::{ChatProvider, ChunkStream};
use crate::types::{ModelChat, ProviderKind, ProviderModel};
use crate::Error;

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// DeepSeek provider implementation.
#[derive(Debug)]
pub struct DeepSeekProvider {
    inner: OpenAiProvider,
}

impl DeepSeekProvider {
    /// Create a new DeepSeek provider.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url(api_key, DEEPSEEK_BASE_URL.to_string())
    }

    /// Create a new DeepSeek provider with a custom base URL (for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, Error> {
        Ok(Self {
            inner: OpenAiProvider::compatible(ProviderKind::DeepSeek, api_key, base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl ChatProvider for DeepSeekProvider {
    async fn chat(&self, request: &ModelChat) -> Result<String, Error> {
        self.inner.chat(request).await
    }

    async fn stream_chat(&self, request: &ModelChat) -> Result<ChunkStream, Error> {
        self.inner.stream_chat(request).await
    }

    fn models(&self) -> Vec<ProviderModel> {
        self.inner.models()
    }
}

//! OpenAI chat-completions binding, also reused by the OpenAI-compatible
//! DeepSeek API.

use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;

use crate::provider::{ChatProvider, ChunkStream, StreamChunk};
use crate::sse::SseDecoderExt;
use crate::types::{ContentPart, MessageContent, ModelChat, ProviderKind, ProviderModel, Role};
use crate::{catalog, Error};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub(crate) mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    pub struct CompletionsRequest {
        pub model: String,
        pub messages: Vec<Message>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub max_tokens: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub stream: Option<bool>,
    }

    #[derive(Debug, Serialize)]
    pub struct Message {
        pub role: &'static str,
        pub content: Content,
    }

    #[derive(Debug, Serialize)]
    #[serde(untagged)]
    pub enum Content {
        Text(String),
        Parts(Vec<Part>),
    }

    #[derive(Debug, Serialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Part {
        Text { text: String },
        ImageUrl { image_url: ImageUrl },
    }

    #[derive(Debug, Serialize)]
    pub struct ImageUrl {
        pub url: String,
    }

    /// Response shape for both buffered completions (`message`) and stream
    /// chunks (`delta`).
    #[derive(Debug, Deserialize)]
    pub struct CompletionsResponse {
        #[serde(default)]
        pub choices: Vec<Choice>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Choice {
        pub message: Option<ChoiceContent>,
        pub delta: Option<ChoiceContent>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChoiceContent {
        pub content: Option<String>,
    }
}

/// OpenAI provider implementation.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    kind: ProviderKind,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::compatible(ProviderKind::OpenAi, api_key, OPENAI_BASE_URL.to_string())
    }

    /// Create a new OpenAI provider with a custom base URL (for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, Error> {
        Self::compatible(ProviderKind::OpenAi, api_key, base_url)
    }

    /// Create a binding for any OpenAI-compatible API.
    pub(crate) fn compatible(
        kind: ProviderKind,
        api_key: String,
        base_url: String,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            kind,
        })
    }

    fn convert_request(&self, request: &ModelChat, stream: bool) -> wire::CompletionsRequest {
        let messages = request.messages.iter().map(convert_message).collect();

        wire::CompletionsRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: stream.then_some(true),
        }
    }

    async fn post_completions(
        &self,
        body: &wire::CompletionsRequest,
    ) -> Result<reqwest::Response, Error> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(Error::provider(
                self.kind.label(),
                super::api_error_message(status, &body),
            ));
        }

        Ok(response)
    }
}

fn convert_message(message: &crate::types::ChatMessage) -> wire::Message {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let content = match &message.content {
        MessageContent::Text(text) => wire::Content::Text(text.clone()),
        MessageContent::Parts(parts) => wire::Content::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => wire::Part::Text { text: text.clone() },
                    ContentPart::ImageUrl { url } => wire::Part::ImageUrl {
                        image_url: wire::ImageUrl { url: url.clone() },
                    },
                })
                .collect(),
        ),
    };

    wire::Message { role, content }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    async fn chat(&self, request: &ModelChat) -> Result<String, Error> {
        let body = self.convert_request(request, false);
        let response = self.post_completions(&body).await?;

        let completion: wire::CompletionsResponse = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::provider(
                self.kind.label(),
                format!("Empty response from {}", self.kind.label()),
            ));
        }

        Ok(text)
    }

    async fn stream_chat(&self, request: &ModelChat) -> Result<ChunkStream, Error> {
        let body = self.convert_request(request, true);
        let response = self.post_completions(&body).await?;

        let chunks = response
            .bytes_stream()
            .sse_records()
            .filter_map(|record| async move {
                match record {
                    Ok(record) if record.is_done() => None,
                    Ok(record) => {
                        // Skip records that do not parse or carry no delta
                        // (role-only frames, keep-alives).
                        serde_json::from_str::<wire::CompletionsResponse>(&record.data)
                            .ok()
                            .and_then(|chunk| chunk.choices.into_iter().next())
                            .and_then(|choice| choice.delta)
                            .and_then(|delta| delta.content)
                            .filter(|content| !content.is_empty())
                            .map(|content| Ok(StreamChunk::new(content)))
                    }
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(Box::pin(chunks))
    }

    fn models(&self) -> Vec<ProviderModel> {
        catalog::models_for(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn test_provider_creation() {
        assert!(OpenAiProvider::new("test-key".to_string()).is_ok());
    }

    #[test]
    fn test_request_conversion() {
        let provider = OpenAiProvider::new("test-key".to_string()).unwrap();
        let request = ModelChat::new(ProviderKind::OpenAi, "gpt-4o-mini")
            .with_user("Hello")
            .with_temperature(0.7)
            .with_max_tokens(100);

        let body = provider.convert_request(&request, true);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.temperature, Some(0.7));
        assert_eq!(body.max_tokens, Some(100));
        assert_eq!(body.stream, Some(true));

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""messages":[{"role":"user","content":"Hello"}]"#));
    }

    #[test]
    fn test_image_parts_use_openai_shape() {
        let message = ChatMessage::user(MessageContent::Parts(vec![
            ContentPart::Text {
                text: "Describe".to_string(),
            },
            ContentPart::ImageUrl {
                url: "https://example.com/a.png".to_string(),
            },
        ]));

        let json = serde_json::to_string(&convert_message(&message)).unwrap();
        assert!(json.contains(r#""image_url":{"url":"https://example.com/a.png"}"#));
    }

    #[test]
    fn test_stream_chunk_parsing() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        let chunk: wire::CompletionsResponse = serde_json::from_str(data).unwrap();
        let content = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content);
        assert_eq!(content.as_deref(), Some("Hel"));
    }
}

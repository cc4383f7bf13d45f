//! Gemini binding against the Generative Language API
//! (`generateContent` / `streamGenerateContent`).

use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;

use crate::provider::{ChatProvider, ChunkStream, StreamChunk};
use crate::sse::SseDecoderExt;
use crate::types::{ModelChat, ProviderKind, ProviderModel, Role};
use crate::{catalog, Error};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    pub struct GenerateRequest {
        pub contents: Vec<Content>,
        #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
        pub system_instruction: Option<Content>,
        #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
        pub generation_config: Option<GenerationConfig>,
    }

    #[derive(Debug, Serialize)]
    pub struct Content {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub role: Option<String>,
        pub parts: Vec<Part>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Part {
        pub text: String,
    }

    #[derive(Debug, Serialize)]
    pub struct GenerationConfig {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f32>,
        #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
        pub max_output_tokens: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GenerateResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Candidate {
        pub content: Option<CandidateContent>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CandidateContent {
        #[serde(default)]
        pub parts: Vec<Part>,
    }

    impl GenerateResponse {
        /// Concatenated text of the first candidate.
        pub fn text(self) -> String {
            self.candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .map(|part| part.text)
                        .collect::<Vec<_>>()
                        .join("")
                })
                .unwrap_or_default()
        }
    }
}

/// Gemini provider implementation.
#[derive(Debug)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url(api_key, GEMINI_BASE_URL.to_string())
    }

    /// Create a new Gemini provider with a custom base URL (for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Convert to Gemini's shape: system messages become the system
    /// instruction, assistant turns use the `model` role. Text only — image
    /// parts are flattened away by `MessageContent::text`.
    fn convert_request(&self, request: &ModelChat) -> wire::GenerateRequest {
        let mut contents = Vec::new();
        let mut system_texts = Vec::new();

        for message in &request.messages {
            match message.role {
                Role::System => system_texts.push(message.text()),
                Role::User => contents.push(wire::Content {
                    role: Some("user".to_string()),
                    parts: vec![wire::Part {
                        text: message.text(),
                    }],
                }),
                Role::Assistant => contents.push(wire::Content {
                    role: Some("model".to_string()),
                    parts: vec![wire::Part {
                        text: message.text(),
                    }],
                }),
            }
        }

        let system_instruction = if system_texts.is_empty() {
            None
        } else {
            Some(wire::Content {
                role: None,
                parts: vec![wire::Part {
                    text: system_texts.join("\n"),
                }],
            })
        };

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(wire::GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        wire::GenerateRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    async fn post_generate(
        &self,
        request: &ModelChat,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, Error> {
        let body = self.convert_request(request);
        let url = format!("{}/models/{}:{method}", self.base_url, request.model);

        let response = self
            .client
            .post(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(Error::provider(
                ProviderKind::Gemini.label(),
                super::api_error_message(status, &body),
            ));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    async fn chat(&self, request: &ModelChat) -> Result<String, Error> {
        let response = self.post_generate(request, "generateContent", &[]).await?;

        let generated: wire::GenerateResponse = response.json().await?;
        let text = generated.text();

        if text.is_empty() {
            return Err(Error::provider(
                ProviderKind::Gemini.label(),
                "Empty response from Gemini",
            ));
        }

        Ok(text)
    }

    async fn stream_chat(&self, request: &ModelChat) -> Result<ChunkStream, Error> {
        let response = self
            .post_generate(request, "streamGenerateContent", &[("alt", "sse")])
            .await?;

        let chunks = response
            .bytes_stream()
            .sse_records()
            .filter_map(|record| async move {
                match record {
                    Ok(record) if record.is_done() => None,
                    Ok(record) => serde_json::from_str::<wire::GenerateResponse>(&record.data)
                        .ok()
                        .map(wire::GenerateResponse::text)
                        .filter(|text| !text.is_empty())
                        .map(|text| Ok(StreamChunk::new(text))),
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(Box::pin(chunks))
    }

    fn models(&self) -> Vec<ProviderModel> {
        catalog::models_for(ProviderKind::Gemini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn test_provider_creation() {
        assert!(GeminiProvider::new("test-key".to_string()).is_ok());
    }

    #[test]
    fn test_request_conversion_roles() {
        let provider = GeminiProvider::new("test-key".to_string()).unwrap();
        let request = ModelChat::new(ProviderKind::Gemini, "gemini-1.5-flash")
            .with_message(ChatMessage::system("Be brief"))
            .with_message(ChatMessage::user("Hi"))
            .with_message(ChatMessage::assistant("Hello"))
            .with_message(ChatMessage::user("Bye"));

        let body = provider.convert_request(&request);
        assert_eq!(body.contents.len(), 3);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
        assert!(body.system_instruction.is_some());
    }

    #[test]
    fn test_generation_config_omitted_when_unset() {
        let provider = GeminiProvider::new("test-key".to_string()).unwrap();
        let request = ModelChat::new(ProviderKind::Gemini, "gemini-1.5-flash").with_user("Hi");

        let body = provider.convert_request(&request);
        assert!(body.generation_config.is_none());

        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("generationConfig"));
    }

    #[test]
    fn test_stream_record_parsing() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        let chunk: wire::GenerateResponse = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.text(), "Hello");
    }
}

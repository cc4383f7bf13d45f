//! Thin HTTP bindings for the supported vendors.

pub mod deepseek;
pub mod gemini;
pub mod openai;

pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use reqwest::StatusCode;
use serde::Deserialize;

/// Error envelope shared by the OpenAI-compatible and Gemini APIs:
/// `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Extract the vendor's message from an error response body, falling back to
/// the raw body when it does not match the envelope.
pub(crate) fn api_error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|d| d.message);

    match detail {
        Some(message) => format!("{message} (code: {})", status.as_u16()),
        None => format!("API error {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        let msg = api_error_message(StatusCode::UNAUTHORIZED, body);
        assert_eq!(msg, "Incorrect API key provided (code: 401)");
    }

    #[test]
    fn test_error_message_fallback() {
        let msg = api_error_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
    }
}

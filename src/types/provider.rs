use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The supported chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] =
        [ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::DeepSeek];

    /// The wire identifier for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Human-readable vendor name, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(Error::UnknownProvider(other.to_string())),
        }
    }
}

/// Generation limits advertised for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelLimits {
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// One entry of a provider's model catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub id: String,
    pub label: String,
    #[serde(rename = "default", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ModelLimits>,
    #[serde(
        rename = "supportsImages",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub supports_images: Option<bool>,
}

impl ProviderModel {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_default: false,
            limits: None,
            supports_images: None,
        }
    }

    /// Mark this model as the provider's default.
    pub fn default_model(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.limits = Some(ModelLimits {
            max_tokens: Some(max_tokens),
        });
        self
    }

    pub fn with_image_support(mut self) -> Self {
        self.supports_images = Some(true);
        self
    }
}

/// Catalog entry for one provider, as returned by the model listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderModels {
    pub r#type: ProviderKind,
    pub models: Vec<ProviderModel>,
}

/// Request body for the model listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderModelsRequest {
    #[serde(default)]
    pub providers: Vec<String>,
}

/// Response body for the model listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderModelsResponse {
    pub data: Vec<ProviderModels>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        for kind in ProviderKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));

            let parsed: ProviderKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "mistral".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(ref id) if id == "mistral"));
    }

    #[test]
    fn test_model_serialization_omits_unset_fields() {
        let model = ProviderModel::new("gpt-4o-mini", "GPT-4o mini")
            .default_model()
            .with_max_tokens(16384);

        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(
            json,
            r#"{"id":"gpt-4o-mini","label":"GPT-4o mini","default":true,"limits":{"maxTokens":16384}}"#
        );

        let plain = ProviderModel::new("deepseek-chat", "DeepSeek Chat");
        let json = serde_json::to_string(&plain).unwrap();
        assert_eq!(json, r#"{"id":"deepseek-chat","label":"DeepSeek Chat"}"#);
    }
}

//! Static model catalogs, read-only at request time.

use crate::types::{ProviderKind, ProviderModel};

/// The models advertised for one provider.
pub fn models_for(kind: ProviderKind) -> Vec<ProviderModel> {
    match kind {
        ProviderKind::OpenAi => vec![
            ProviderModel::new("gpt-4o-mini", "GPT-4o mini")
                .default_model()
                .with_max_tokens(16384)
                .with_image_support(),
            ProviderModel::new("gpt-4o", "GPT-4o")
                .with_max_tokens(128000)
                .with_image_support(),
        ],
        ProviderKind::Gemini => vec![
            ProviderModel::new("gemini-1.5-flash", "Gemini 1.5 Flash")
                .default_model()
                .with_max_tokens(1000000),
            ProviderModel::new("gemini-1.5-pro", "Gemini 1.5 Pro").with_max_tokens(2000000),
        ],
        ProviderKind::DeepSeek => vec![
            ProviderModel::new("deepseek-chat", "DeepSeek Chat")
                .default_model()
                .with_max_tokens(32768),
            ProviderModel::new("deepseek-coder", "DeepSeek Coder").with_max_tokens(16384),
        ],
    }
}

/// The provider's default model id.
pub fn default_model(kind: ProviderKind) -> Option<String> {
    models_for(kind)
        .into_iter()
        .find(|m| m.is_default)
        .map(|m| m.id)
}

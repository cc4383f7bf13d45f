//! Provider resolution and caching.

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::provider::ChatProvider;
use crate::providers::{DeepSeekProvider, GeminiProvider, OpenAiProvider};
use crate::types::ProviderKind;
use crate::Error;

/// Credentials for the known providers, read from process configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
}

impl ProviderSettings {
    /// Read credentials from environment variables. Unset and empty values
    /// both count as missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: read_env("OPENAI_API_KEY"),
            gemini_api_key: read_env("GEMINI_API_KEY"),
            deepseek_api_key: read_env("DEEPSEEK_API_KEY"),
        }
    }

    fn key_for(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::DeepSeek => self.deepseek_api_key.as_deref(),
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Resolves provider kinds to cached client instances.
///
/// Constructed once at process start and injected into the adapters that
/// need it. Each provider is constructed on first resolve and cached for
/// the life of the process; a missing credential is terminal and is never
/// retried.
pub struct ProviderRegistry {
    settings: ProviderSettings,
    cache: Mutex<HashMap<ProviderKind, Arc<dyn ChatProvider>>>,
}

impl ProviderRegistry {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderSettings::from_env())
    }

    /// Pre-seed the registry with a concrete instance. Used to inject test
    /// doubles without global mutation.
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn ChatProvider>) -> Self {
        self.cache
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(kind, provider);
        self
    }

    /// Resolve a provider, constructing and caching it on first use.
    pub fn resolve(&self, kind: ProviderKind) -> Result<Arc<dyn ChatProvider>, Error> {
        let mut cache = self.lock_cache();

        if let Some(provider) = cache.get(&kind) {
            return Ok(provider.clone());
        }

        let provider = self.construct(kind)?;
        cache.insert(kind, provider.clone());
        Ok(provider)
    }

    /// Resolve a provider by its wire identifier.
    pub fn resolve_name(&self, id: &str) -> Result<Arc<dyn ChatProvider>, Error> {
        self.resolve(id.parse()?)
    }

    fn construct(&self, kind: ProviderKind) -> Result<Arc<dyn ChatProvider>, Error> {
        let api_key = self
            .settings
            .key_for(kind)
            .ok_or_else(|| Error::config(format!("Missing {} API key", kind.label())))?
            .to_string();

        Ok(match kind {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(api_key)?),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(api_key)?),
            ProviderKind::DeepSeek => Arc::new(DeepSeekProvider::new(api_key)?),
        })
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<ProviderKind, Arc<dyn ChatProvider>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

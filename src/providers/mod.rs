/*!
 * Translation capability implementations.
 *
 * This module contains the interface the batch translator consumes and the
 * concrete backends behind it:
 * - Google: Google's public web translation endpoint (default)
 * - Ollama: Local LLM server
 * - Cache: memoising decorator around any other capability
 * - Mock: scriptable test double
 */

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::CapabilityError;

/// Common trait for all translation capabilities
///
/// The batch translator only relies on index-positional correspondence
/// between `translate_batch` inputs and outputs. Empty strings are never
/// submitted.
#[async_trait]
pub trait TranslationCapability: Send + Sync + Debug {
    /// Translate several texts in one call
    ///
    /// # Returns
    /// * `Result<Vec<String>, CapabilityError>` - one translation per input, in order
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, CapabilityError>;

    /// Translate a single text
    async fn translate_one(&self, text: &str) -> Result<String, CapabilityError>;

    /// Human readable name used in logs
    fn name(&self) -> String;
}

/// Build the capability selected in the configuration
pub fn create_capability(config: &Config) -> Result<Arc<dyn TranslationCapability>> {
    let translation = &config.translation;

    let backend: Arc<dyn TranslationCapability> = match translation.provider {
        TranslationProvider::Google => Arc::new(google::GoogleTranslate::from_config(
            translation,
            &config.source_language,
            &config.target_language,
        )?),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::from_config(
            translation,
            &config.source_language,
            &config.target_language,
        )?),
    };

    if translation.cache_enabled {
        debug!("Wrapping {} in translation cache", backend.name());
        Ok(Arc::new(cache::CachedCapability::new(backend)))
    } else {
        Ok(backend)
    }
}

/// Delay before retry `attempt` (1-based), doubling from `base_ms`
pub(crate) fn backoff_delay(base_ms: u64, attempt: u32) -> std::time::Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    std::time::Duration::from_millis(base_ms.saturating_mul(factor))
}

/// Whether a failed request is worth repeating
pub(crate) fn is_retryable(error: &CapabilityError) -> bool {
    match error {
        CapabilityError::ConnectionError(_) | CapabilityError::RateLimitExceeded(_) => true,
        CapabilityError::ApiError { status_code, .. } => *status_code >= 500,
        _ => false,
    }
}

pub mod cache;
pub mod google;
pub mod mock;
pub mod ollama;

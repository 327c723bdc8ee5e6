/*!
 * Translation caching functionality.
 *
 * Subtitles repeat themselves a lot ("Yes.", "What?", song markers). This
 * decorator remembers every translation it has seen so identical texts cost
 * one call per run, and batch calls only forward the texts it has not seen.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::CapabilityError;
use crate::providers::TranslationCapability;

/// Memoising wrapper around another capability
#[derive(Debug)]
pub struct CachedCapability {
    /// Capability doing the actual work
    inner: Arc<dyn TranslationCapability>,

    /// Source text to translation
    cache: RwLock<HashMap<String, String>>,

    /// Cache hit counter
    hits: AtomicUsize,

    /// Cache miss counter
    misses: AtomicUsize,
}

impl CachedCapability {
    /// Wrap a capability
    pub fn new(inner: Arc<dyn TranslationCapability>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    fn lookup(&self, text: &str) -> Option<String> {
        let found = self.cache.read().get(text).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for '{}'", truncate_text(text, 30));
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn store(&self, text: &str, translation: &str) {
        self.cache
            .write()
            .insert(text.to_string(), translation.to_string());
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    /// Number of cached translations
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[async_trait]
impl TranslationCapability for CachedCapability {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, CapabilityError> {
        let mut results: Vec<Option<String>> = texts.iter().map(|t| self.lookup(t)).collect();

        // Forward each distinct uncached text once
        let mut missing: Vec<String> = Vec::new();
        for (text, result) in texts.iter().zip(&results) {
            if result.is_none() && !missing.contains(text) {
                missing.push(text.clone());
            }
        }

        if !missing.is_empty() {
            let translated = self.inner.translate_batch(&missing).await?;
            if translated.len() != missing.len() {
                return Err(CapabilityError::CardinalityMismatch {
                    expected: missing.len(),
                    actual: translated.len(),
                });
            }

            for (text, translation) in missing.iter().zip(&translated) {
                self.store(text, translation);
            }

            let fresh: HashMap<&String, &String> = missing.iter().zip(&translated).collect();
            for (text, result) in texts.iter().zip(results.iter_mut()) {
                if result.is_none() {
                    *result = fresh.get(text).map(|t| t.to_string());
                }
            }
        }

        Ok(results.into_iter().map(Option::unwrap_or_default).collect())
    }

    async fn translate_one(&self, text: &str) -> Result<String, CapabilityError> {
        if let Some(cached) = self.lookup(text) {
            return Ok(cached);
        }

        let translated = self.inner.translate_one(text).await?;
        self.store(text, &translated);
        Ok(translated)
    }

    fn name(&self) -> String {
        format!("{} (cached)", self.inner.name())
    }
}

/// Truncate text for log output
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

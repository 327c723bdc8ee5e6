/*!
 * Mock translation capability for testing.
 *
 * This module provides a scriptable capability that simulates different behaviors:
 * - `MockCapability::identity()` - Returns every text unchanged
 * - `MockCapability::prefixing(p)` - Returns every text with a prefix
 * - `MockCapability::failing()` - Always fails with an error
 *
 * Batch and single-item calls can be made to misbehave independently
 * with the builder methods, and every call is counted.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::CapabilityError;
use crate::providers::TranslationCapability;

/// How the mock answers batch calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchBehavior {
    /// One result per input
    Working,
    /// Always fails with an error
    Failing,
    /// Returns every translation joined into a single string
    Combined,
}

/// Function producing a reply from an input text
pub type ReplyFn = fn(&str) -> String;

/// Mock capability for testing translation behavior
#[derive(Debug)]
pub struct MockCapability {
    /// Prefix added to every translation
    prefix: String,
    /// Batch behavior mode
    batch_behavior: BatchBehavior,
    /// Whether every call fails
    always_fail: bool,
    /// Single-item inputs that fail
    failing_inputs: HashSet<String>,
    /// Custom reply generator (optional)
    custom_reply: Option<ReplyFn>,
    /// Batch call counter
    batch_count: Arc<AtomicUsize>,
    /// Single-item call counter
    single_count: Arc<AtomicUsize>,
    /// Inputs of every batch call
    batch_log: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockCapability {
    fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            batch_behavior: BatchBehavior::Working,
            always_fail: false,
            failing_inputs: HashSet::new(),
            custom_reply: None,
            batch_count: Arc::new(AtomicUsize::new(0)),
            single_count: Arc::new(AtomicUsize::new(0)),
            batch_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that returns its input unchanged
    pub fn identity() -> Self {
        Self::with_prefix("")
    }

    /// Create a mock that prefixes every translation
    pub fn prefixing(prefix: impl Into<String>) -> Self {
        Self::with_prefix(prefix)
    }

    /// Create a mock where every call fails
    pub fn failing() -> Self {
        let mut mock = Self::identity();
        mock.always_fail = true;
        mock
    }

    /// Make batch calls fail
    pub fn failing_batch(mut self) -> Self {
        self.batch_behavior = BatchBehavior::Failing;
        self
    }

    /// Make batch calls return one combined string
    pub fn combining_batch(mut self) -> Self {
        self.batch_behavior = BatchBehavior::Combined;
        self
    }

    /// Make single-item calls fail for these inputs (batch calls containing them fail too)
    pub fn failing_on(mut self, inputs: &[&str]) -> Self {
        self.failing_inputs
            .extend(inputs.iter().map(|input| input.to_string()));
        self
    }

    /// Set a custom reply generator
    pub fn with_custom_reply(mut self, generator: ReplyFn) -> Self {
        self.custom_reply = Some(generator);
        self
    }

    /// Number of batch calls received
    pub fn batch_calls(&self) -> usize {
        self.batch_count.load(Ordering::SeqCst)
    }

    /// Number of single-item calls received
    pub fn single_calls(&self) -> usize {
        self.single_count.load(Ordering::SeqCst)
    }

    /// Inputs of every batch call, in call order
    pub fn batch_inputs(&self) -> Vec<Vec<String>> {
        self.batch_log.lock().clone()
    }

    fn reply(&self, text: &str) -> String {
        match self.custom_reply {
            Some(generator) => generator(text),
            None => format!("{}{}", self.prefix, text),
        }
    }

    fn simulated_failure(&self, text: &str) -> CapabilityError {
        CapabilityError::ApiError {
            status_code: 503,
            message: format!("Simulated failure for {:?}", text),
        }
    }
}

impl Clone for MockCapability {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            batch_behavior: self.batch_behavior,
            always_fail: self.always_fail,
            failing_inputs: self.failing_inputs.clone(),
            custom_reply: self.custom_reply,
            batch_count: Arc::clone(&self.batch_count),
            single_count: Arc::clone(&self.single_count),
            batch_log: Arc::clone(&self.batch_log),
        }
    }
}

#[async_trait]
impl TranslationCapability for MockCapability {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, CapabilityError> {
        self.batch_count.fetch_add(1, Ordering::SeqCst);
        self.batch_log.lock().push(texts.to_vec());

        if self.always_fail || self.batch_behavior == BatchBehavior::Failing {
            return Err(CapabilityError::ApiError {
                status_code: 500,
                message: "Simulated batch failure".to_string(),
            });
        }

        if let Some(bad) = texts.iter().find(|t| self.failing_inputs.contains(*t)) {
            return Err(self.simulated_failure(bad));
        }

        let translated: Vec<String> = texts.iter().map(|t| self.reply(t)).collect();
        match self.batch_behavior {
            BatchBehavior::Combined => Ok(vec![translated.join("\n")]),
            _ => Ok(translated),
        }
    }

    async fn translate_one(&self, text: &str) -> Result<String, CapabilityError> {
        self.single_count.fetch_add(1, Ordering::SeqCst);

        if self.always_fail || self.failing_inputs.contains(text) {
            return Err(self.simulated_failure(text));
        }

        Ok(self.reply(text))
    }

    fn name(&self) -> String {
        "Mock".to_string()
    }
}

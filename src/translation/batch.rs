/*!
 * Batch translation processing.
 *
 * This module splits a document into fixed-size windows of blocks, sends
 * the text of each window to the translation capability in one call, and
 * substitutes the results back block by block. When the batch call fails
 * it degrades to one call per block, and when one of those fails the block
 * keeps its original text. Nothing in here aborts a document except an
 * explicit cancellation.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::errors::TranslationError;
use crate::providers::TranslationCapability;
use crate::subtitle_processor::SubtitleBlock;

use super::alignment::align_block;

/// Windowing and pacing options for the batch translator
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Number of blocks per window
    pub window_size: usize,

    /// Pause between two windows
    pub window_pause: Duration,

    /// Pause between single-item fallback calls
    pub item_pause: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            window_size: 20,
            window_pause: Duration::from_millis(200),
            item_pause: Duration::from_millis(50),
        }
    }
}

impl BatchOptions {
    /// Options without any pauses
    pub fn unpaced(window_size: usize) -> Self {
        Self {
            window_size,
            window_pause: Duration::ZERO,
            item_pause: Duration::ZERO,
        }
    }
}

/// Outcome of the recovery chain for one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadOutcome {
    /// Translated by the batch call
    Translated(String),
    /// Translated by the single-item fallback
    Degraded(String),
    /// Single-item fallback failed, original text kept
    Original(String),
}

impl PayloadOutcome {
    /// Text to hand to the alignment step
    pub fn text(&self) -> &str {
        match self {
            PayloadOutcome::Translated(text)
            | PayloadOutcome::Degraded(text)
            | PayloadOutcome::Original(text) => text,
        }
    }
}

/// Progress event emitted after every window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowProgress {
    /// Zero-based index of the finished window
    pub window_index: usize,
    /// Number of windows in the document
    pub total_windows: usize,
    /// Blocks processed so far, including this window
    pub blocks_done: usize,
    /// Blocks in the document
    pub total_blocks: usize,
    /// Payloads translated by a batch call in this window
    pub translated: usize,
    /// Payloads translated by the single-item fallback in this window
    pub degraded: usize,
    /// Payloads left untranslated in this window
    pub untranslated: usize,
}

impl WindowProgress {
    fn tally(&mut self, outcomes: &[PayloadOutcome]) {
        for outcome in outcomes {
            match outcome {
                PayloadOutcome::Translated(_) => self.translated += 1,
                PayloadOutcome::Degraded(_) => self.degraded += 1,
                PayloadOutcome::Original(_) => self.untranslated += 1,
            }
        }
    }
}

/// Batch translator for processing subtitle blocks in windows
pub struct BatchTranslator {
    /// The capability all translation goes through
    capability: Arc<dyn TranslationCapability>,

    /// Windowing and pacing options
    options: BatchOptions,

    /// Set from outside to stop before the next window
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(capability: Arc<dyn TranslationCapability>, options: BatchOptions) -> Self {
        Self {
            capability,
            options: BatchOptions {
                window_size: options.window_size.max(1),
                ..options
            },
            cancel_flag: None,
        }
    }

    /// Stop processing before the next window once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Options in use
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Translate a whole document, window by window
    pub async fn translate_document(
        &self,
        blocks: &[SubtitleBlock],
    ) -> Result<Vec<SubtitleBlock>, TranslationError> {
        self.translate_document_with_progress(blocks, |_| {}).await
    }

    /// Translate a whole document, reporting after each window
    pub async fn translate_document_with_progress(
        &self,
        blocks: &[SubtitleBlock],
        mut progress_callback: impl FnMut(&WindowProgress),
    ) -> Result<Vec<SubtitleBlock>, TranslationError> {
        let window_size = self.options.window_size;
        let total_windows = blocks.len().div_ceil(window_size);
        let mut translated_blocks = Vec::with_capacity(blocks.len());
        let start_time = Instant::now();

        for (window_index, window) in blocks.chunks(window_size).enumerate() {
            if self.is_cancelled() {
                warn!(
                    "Translation cancelled before window {} of {}",
                    window_index + 1,
                    total_windows
                );
                return Err(TranslationError::Cancelled {
                    completed_windows: window_index,
                    total_windows,
                });
            }

            let (window_blocks, outcomes) = self.translate_window(window).await;
            translated_blocks.extend(window_blocks);

            let mut progress = WindowProgress {
                window_index,
                total_windows,
                blocks_done: translated_blocks.len(),
                total_blocks: blocks.len(),
                ..Default::default()
            };
            progress.tally(&outcomes);
            progress_callback(&progress);

            if window_index + 1 < total_windows && !self.options.window_pause.is_zero() {
                tokio::time::sleep(self.options.window_pause).await;
            }
        }

        info!(
            "Translated {} blocks in {} windows ({:?})",
            blocks.len(),
            total_windows,
            start_time.elapsed()
        );

        Ok(translated_blocks)
    }

    /// Translate one window; returns the output blocks and the outcome of every payload sent
    pub async fn translate_window(
        &self,
        window: &[SubtitleBlock],
    ) -> (Vec<SubtitleBlock>, Vec<PayloadOutcome>) {
        let payloads: Vec<String> = window.iter().map(SubtitleBlock::payload).collect();
        let (positions, texts): (Vec<usize>, Vec<String>) = payloads
            .iter()
            .enumerate()
            .filter(|(_, payload)| !payload.trim().is_empty())
            .map(|(idx, payload)| (idx, payload.clone()))
            .unzip();

        if texts.is_empty() {
            debug!("Window of {} blocks has no text, passing through", window.len());
            return (window.to_vec(), Vec::new());
        }

        let outcomes = self.recover_payloads(&texts).await;

        // Scatter back onto window positions; empty payloads stay empty
        let mut results = vec![String::new(); window.len()];
        for (position, outcome) in positions.iter().zip(&outcomes) {
            results[*position] = outcome.text().to_string();
        }

        let blocks = window
            .iter()
            .zip(&results)
            .map(|(block, translated)| align_block(block, translated))
            .collect();

        (blocks, outcomes)
    }

    /// Run the batch → single-item → original chain over non-empty payloads
    pub async fn recover_payloads(&self, payloads: &[String]) -> Vec<PayloadOutcome> {
        match self.capability.translate_batch(payloads).await {
            Ok(translated) if translated.len() == payloads.len() => {
                return translated.into_iter().map(PayloadOutcome::Translated).collect();
            }
            Ok(translated) => {
                warn!(
                    "{} returned {} results for {} texts, retrying individually",
                    self.capability.name(),
                    translated.len(),
                    payloads.len()
                );
            }
            Err(e) => {
                warn!("Batch translation failed, retrying individually: {}", e);
            }
        }

        let mut outcomes = Vec::with_capacity(payloads.len());
        for (idx, payload) in payloads.iter().enumerate() {
            if idx > 0 && !self.options.item_pause.is_zero() {
                tokio::time::sleep(self.options.item_pause).await;
            }

            match self.capability.translate_one(payload).await {
                Ok(translated) => outcomes.push(PayloadOutcome::Degraded(translated)),
                Err(e) => {
                    warn!("Failed to translate entry {}, keeping original text: {}", idx + 1, e);
                    outcomes.push(PayloadOutcome::Original(payload.clone()));
                }
            }
        }

        outcomes
    }
}

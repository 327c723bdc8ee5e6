use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::{self, TranslationCapability};
use crate::subtitle_processor::{parse_blocks, serialize_blocks};
use crate::translation::{BatchTranslator, WindowProgress};

// @module: Application controller for subtitle processing

/// What happened to one input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Document translated and written
    Translated {
        /// Blocks in the document
        blocks: usize,
        /// Payloads that kept their original text
        untranslated: usize,
        /// Written file
        output: PathBuf,
    },
    /// Output already existed and overwriting was not requested
    Skipped {
        /// Existing file
        output: PathBuf,
    },
}

/// Counts for a multi-document run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents translated
    pub translated: usize,
    /// Documents skipped because their output exists
    pub skipped: usize,
    /// Documents that failed
    pub failed: usize,
    /// Whether the run was interrupted
    pub cancelled: bool,
}

impl RunSummary {
    /// Whether every document either translated or was skipped
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Capability shared by every document of the run
    capability: Arc<dyn TranslationCapability>,

    // @field: Set to stop between windows
    cancel_flag: Arc<AtomicBool>,

    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let capability = providers::create_capability(&config)?;
        Ok(Self::with_capability(config, capability))
    }

    /// Create a controller around an existing capability
    pub fn with_capability(config: Config, capability: Arc<dyn TranslationCapability>) -> Self {
        Self {
            config,
            capability,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            show_progress: true,
        }
    }

    /// Do not draw progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Flag that interrupts the run between two windows once set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    fn new_multi_progress(&self) -> MultiProgress {
        if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// Translate one document next to its input
    pub async fn translate_file(&self, input_file: &Path, force_overwrite: bool) -> Result<FileOutcome, AppError> {
        let multi_progress = self.new_multi_progress();
        self.translate_file_with_progress(input_file, force_overwrite, &multi_progress).await
    }

    async fn translate_file_with_progress(
        &self,
        input_file: &Path,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
    ) -> Result<FileOutcome, AppError> {
        let output_path = FileManager::output_path(input_file, &self.config.target_language);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {}, translation already exists (use -f to force overwrite)", input_file.display());
            return Ok(FileOutcome::Skipped { output: output_path });
        }

        info!("Reading: {}", input_file.display());
        let content = FileManager::read_document(input_file)?;
        let blocks = parse_blocks(&content);
        info!("Blocks: {}", blocks.len());

        let translator = BatchTranslator::new(Arc::clone(&self.capability), self.config.batch.options())
            .with_cancel_flag(self.cancel_flag());

        let progress_bar = multi_progress.add(ProgressBar::new(blocks.len() as u64));
        progress_bar.set_style(Self::bar_style("blocks"));
        progress_bar.set_message("Translating");

        let mut untranslated = 0;
        let pb = progress_bar.clone();
        let result = translator
            .translate_document_with_progress(&blocks, |progress: &WindowProgress| {
                untranslated += progress.untranslated;
                pb.set_position(progress.blocks_done as u64);
            })
            .await;
        progress_bar.finish_and_clear();
        let translated = result?;

        if untranslated > 0 {
            warn!("{} block(s) of {} kept their original text", untranslated, input_file.display());
        }

        FileManager::write_to_file(&output_path, &serialize_blocks(&translated))?;
        info!("Done: {}", output_path.display());

        Ok(FileOutcome::Translated {
            blocks: translated.len(),
            untranslated,
            output: output_path,
        })
    }

    /// Translate every document in order; failures are logged and counted, never fatal
    pub async fn run(&self, inputs: &[PathBuf], force_overwrite: bool) -> RunSummary {
        let start_time = Instant::now();
        let multi_progress = self.new_multi_progress();
        let mut summary = RunSummary::default();

        info!(
            "{} ({}): {} -> {}",
            self.capability.name(),
            self.config.translation.get_model(),
            self.config.source_language,
            self.config.target_language
        );

        let files_pb = if inputs.len() > 1 {
            let pb = multi_progress.add(ProgressBar::new(inputs.len() as u64));
            pb.set_style(Self::bar_style("files"));
            Some(pb)
        } else {
            None
        };

        for input_file in inputs {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let file_name = input_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            if let Some(pb) = &files_pb {
                pb.set_message(format!("Processing: {}", file_name));
            }

            match self
                .translate_file_with_progress(input_file, force_overwrite, &multi_progress)
                .await
            {
                Ok(FileOutcome::Translated { .. }) => summary.translated += 1,
                Ok(FileOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(AppError::Translation(e)) if self.is_cancelled() => {
                    warn!("Stopped while translating {}: {}", file_name, e);
                    summary.cancelled = true;
                    summary.failed += 1;
                    break;
                }
                Err(e) => {
                    error!("Failed on {}: {}", input_file.display(), e);
                    summary.failed += 1;
                }
            }

            if let Some(pb) = &files_pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = files_pb {
            pb.finish_and_clear();
        }

        info!(
            "Processing completed in {}: {} translated, {} skipped, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed
        );

        summary
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

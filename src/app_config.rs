//! Application configuration module
//!
//! This module handles the application configuration including loading,
//! validating and saving configuration settings.

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::language_utils;
use crate::translation::batch::BatchOptions;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO) or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Windowing and pacing of capability calls
    #[serde(default)]
    pub batch: BatchSettings,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google web translation endpoint
    #[default]
    Google,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

/// Windowing and pacing settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchSettings {
    /// Blocks submitted per batch call
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Pause between two windows in milliseconds
    #[serde(default = "default_window_pause_ms")]
    pub window_pause_ms: u64,

    /// Pause between single-item fallback calls in milliseconds
    #[serde(default = "default_item_pause_ms")]
    pub item_pause_ms: u64,
}

impl BatchSettings {
    /// Options for the batch translator
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            window_size: self.window_size,
            window_pause: Duration::from_millis(self.window_pause_ms),
            item_pause: Duration::from_millis(self.item_pause_ms),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            window_pause_ms: default_window_pause_ms(),
            item_pause_ms: default_item_pause_ms(),
        }
    }
}

/// Google web translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleConfig {
    /// Service endpoint URL
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_google_endpoint(),
        }
    }
}

/// Ollama service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    /// Model name (e.g., "llama3.2:3b", "mistral")
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: default_ollama_model(),
            endpoint: default_ollama_endpoint(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Whether identical texts are translated only once per run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Google settings
    #[serde(default)]
    pub google: GoogleConfig,

    /// Ollama settings
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl TranslationConfig {
    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.provider {
            TranslationProvider::Google => "web".to_string(),
            TranslationProvider::Ollama => self.ollama.model.clone(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        let endpoint = match self.provider {
            TranslationProvider::Google => &self.google.endpoint,
            TranslationProvider::Ollama => &self.ollama.endpoint,
        };

        if !endpoint.is_empty() {
            return endpoint.clone();
        }

        // Default fallback based on provider type
        match self.provider {
            TranslationProvider::Google => default_google_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            cache_enabled: true,
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            google: GoogleConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    language_utils::AUTO_DETECT.to_string()
}

fn default_target_language() -> String {
    "fa".to_string()
}

fn default_window_size() -> usize {
    20
}

fn default_window_pause_ms() -> u64 {
    200
}

fn default_item_pause_ms() -> u64 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the following text from {source_language} to {target_language}. Keep the line breaks of the original. Only respond with the translated text, without any explanations or notes.".to_string()
}

impl Config {
    /// Load the configuration file, writing the defaults there first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.batch.window_size == 0 {
            return Err(anyhow!("Window size must be at least 1"));
        }

        if !language_utils::is_auto(&self.source_language) {
            language_utils::validate_language_code(&self.source_language)
                .context("Invalid source language")?;
        }

        if language_utils::is_auto(&self.target_language) {
            return Err(anyhow!("Target language cannot be auto-detected"));
        }
        language_utils::validate_language_code(&self.target_language)
            .context("Invalid target language")?;

        if language_utils::language_codes_match(&self.source_language, &self.target_language) {
            warn!(
                "Source '{}' and target '{}' are the same language",
                self.source_language, self.target_language
            );
        }

        if self.translation.provider == TranslationProvider::Ollama
            && self.translation.ollama.model.trim().is_empty()
        {
            return Err(anyhow!("A model name is required for the Ollama provider"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            batch: BatchSettings::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

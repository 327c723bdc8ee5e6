use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::CapabilityError;
use crate::language_utils;
use crate::providers::{TranslationCapability, backoff_delay, is_retryable};

/// Ollama client translating through a local LLM
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
    /// System prompt with the language names filled in
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

/// Normalize an endpoint into a base URL with scheme and port
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;
    let port = url.port_or_known_default().unwrap_or(11434);
    let path = url.path().trim_end_matches('/');

    Ok(format!("{}://{}:{}{}", url.scheme(), host, port, path))
}

/// Fill the language placeholders of a prompt template
fn render_system_prompt(template: &str, source_language: &str, target_language: &str) -> String {
    let source_name = language_utils::get_language_name(source_language)
        .unwrap_or_else(|_| source_language.to_string());
    let target_name = language_utils::get_language_name(target_language)
        .unwrap_or_else(|_| target_language.to_string());

    template
        .replace("{source_language}", &source_name)
        .replace("{target_language}", &target_name)
}

/// Pack several texts into one prompt, each after an `<<ENTRY_i>>` marker
pub fn pack_entries(texts: &[String]) -> String {
    let mut combined_text = String::new();
    for (idx, text) in texts.iter().enumerate() {
        combined_text.push_str(&format!("<<ENTRY_{}>>\n", idx));
        combined_text.push_str(text);
        combined_text.push('\n');
    }
    combined_text.push_str("<<END>>");
    combined_text
}

/// Split a reply to [`pack_entries`] back into one text per entry
pub fn unpack_entries(reply: &str, count: usize) -> Result<Vec<String>, CapabilityError> {
    let mut entries = Vec::with_capacity(count);
    let mut current_idx = 0;

    for idx in 0..count {
        let start_marker = format!("<<ENTRY_{}>>", idx);
        let end_marker = if idx + 1 == count {
            "<<END>>".to_string()
        } else {
            format!("<<ENTRY_{}>>", idx + 1)
        };

        let start_pos = reply[current_idx..]
            .find(&start_marker)
            .map(|pos| pos + current_idx + start_marker.len())
            .ok_or_else(|| {
                CapabilityError::ParseError(format!("Could not find start marker for entry {}", idx))
            })?;

        let end_pos = reply[start_pos..]
            .find(&end_marker)
            .map(|pos| pos + start_pos)
            .ok_or_else(|| {
                CapabilityError::ParseError(format!("Could not find end marker for entry {}", idx))
            })?;

        entries.push(reply[start_pos..end_pos].trim().to_string());
        current_idx = end_pos;
    }

    Ok(entries)
}

impl Ollama {
    /// Create a client from the translation settings
    pub fn from_config(
        config: &TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self> {
        let base_url = normalize_endpoint(&config.get_endpoint())?;
        let client = Client::builder()
            .timeout(config.timeout())
            // Ollama speaks HTTP/1.1
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            client,
            model: config.ollama.model.clone(),
            system_prompt: render_system_prompt(
                &config.ollama.system_prompt,
                source_language,
                target_language,
            ),
            temperature: config.ollama.temperature,
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        })
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, CapabilityError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut attempt = 0;

        loop {
            let result = self.send(&url, request).await;
            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    let delay = backoff_delay(self.backoff_base_ms, attempt);
                    warn!("Ollama request failed ({}), retry {} in {:?}", e, attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, url: &str, request: &GenerationRequest) -> Result<GenerationResponse, CapabilityError> {
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, message);
            return Err(CapabilityError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await?;
        serde_json::from_str::<GenerationResponse>(&response_text).map_err(|e| {
            let preview: String = response_text.chars().take(200).collect();
            CapabilityError::ParseError(format!("{} (response starts with {:?})", e, preview))
        })
    }

    fn request_for(&self, prompt: String) -> GenerationRequest {
        GenerationRequest::new(self.model.clone(), prompt)
            .system(self.system_prompt.clone())
            .temperature(self.temperature)
    }
}

#[async_trait]
impl TranslationCapability for Ollama {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, CapabilityError> {
        let prompt = format!(
            "Translate each entry below. Keep every <<ENTRY_n>> marker and the final <<END>> marker exactly as they are.\n\n{}",
            pack_entries(texts)
        );
        let response = self.generate(&self.request_for(prompt)).await?;
        unpack_entries(&response.response, texts.len())
    }

    async fn translate_one(&self, text: &str) -> Result<String, CapabilityError> {
        let response = self.generate(&self.request_for(text.to_string())).await?;
        Ok(response.response.trim().to_string())
    }

    fn name(&self) -> String {
        format!("Ollama ({})", self.model)
    }
}

use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use async_trait::async_trait;
use anyhow::{Context, Result};

use crate::app_config::TranslationConfig;
use crate::errors::CapabilityError;
use crate::providers::{TranslationCapability, backoff_delay, is_retryable};

/// Client for Google's public web translation endpoint
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the service
    endpoint: String,
    /// Source language code, "auto" for detection
    source_language: String,
    /// Target language code
    target_language: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl GoogleTranslate {
    /// Create a new client for the given language pair
    pub fn new(
        endpoint: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("srtlingo/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            source_language: source_language.into().trim().to_lowercase(),
            target_language: target_language.into().trim().to_lowercase(),
            max_retries: 2,
            backoff_base_ms: 500,
        })
    }

    /// Create a client from the translation settings
    pub fn from_config(
        config: &TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self> {
        let mut client = Self::new(
            config.get_endpoint(),
            source_language,
            target_language,
            config.timeout(),
        )?;
        client.max_retries = config.retry_count;
        client.backoff_base_ms = config.retry_backoff_ms;
        Ok(client)
    }

    async fn request(&self, text: &str) -> Result<String, CapabilityError> {
        let url = format!("{}/translate_a/single", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CapabilityError::RateLimitExceeded(format!(
                "{} answered {}",
                self.endpoint, status
            )));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google translate error ({}): {}", status, message);
            return Err(CapabilityError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
pub fn parse_response(body: &Value) -> Result<String, CapabilityError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| CapabilityError::ParseError("missing translation segments".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() && !segments.is_empty() {
        return Err(CapabilityError::ParseError(
            "translation segments contained no text".to_string(),
        ));
    }

    Ok(translated)
}

#[async_trait]
impl TranslationCapability for GoogleTranslate {
    /// The endpoint has no batch form, so items go one after another
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, CapabilityError> {
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.translate_one(text).await?);
        }
        Ok(translated)
    }

    async fn translate_one(&self, text: &str) -> Result<String, CapabilityError> {
        let mut attempt = 0;
        loop {
            match self.request(text).await {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    let delay = backoff_delay(self.backoff_base_ms, attempt);
                    warn!("Google translate request failed ({}), retry {} in {:?}", e, attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!("Google translate request failed after {} retries: {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    fn name(&self) -> String {
        format!("Google Translate ({} -> {})", self.source_language, self.target_language)
    }
}

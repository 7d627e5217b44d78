//! Vision client trait and the Ollama implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ootd_core::defaults::{
    DEFAULT_OLLAMA_VISION_MODEL, HEALTH_CHECK_TIMEOUT_SECS, OLLAMA_URL, VISION_TIMEOUT_SECS,
};
use ootd_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModuleSettings;

/// A vision-capable model that answers a question about an image.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Ask `question` about a base64-encoded image and return the model's text.
    async fn respond(&self, question: &str, image_base64: &str) -> Result<String>;

    /// Check if the vision service is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Ollama-based vision client (e.g., qwen3-vl, llava).
pub struct OllamaVisionClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaVisionClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout_secs: VISION_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build from a vision module's settings, filling in local defaults.
    pub fn from_settings(settings: &ModuleSettings) -> Result<Self> {
        let base_url = settings.url.as_deref().unwrap_or(OLLAMA_URL);
        let model = settings
            .model_name
            .as_deref()
            .unwrap_or(DEFAULT_OLLAMA_VISION_MODEL);
        Ok(Self::new(base_url, model)
            .with_timeout(settings.timeout_secs.unwrap_or(VISION_TIMEOUT_SECS)))
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<&'a str>, // base64 encoded
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[async_trait]
impl VisionClient for OllamaVisionClient {
    async fn respond(&self, question: &str, image_base64: &str) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt: question,
            images: vec![image_base64],
            stream: false,
        };

        let start = Instant::now();
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        let result: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse vision response: {}", e)))?;

        debug!(
            model = %self.model,
            response_len = result.response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Ollama vision response"
        );
        Ok(result.response)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

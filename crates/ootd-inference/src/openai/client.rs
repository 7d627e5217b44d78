//! OpenAI-compatible vision client implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, info, warn};

use ootd_core::defaults::{
    DEFAULT_OPENAI_VISION_MODEL, HEALTH_CHECK_TIMEOUT_SECS, OPENAI_URL, VISION_TIMEOUT_SECS,
};
use ootd_core::{Error, Result};

use super::error::{to_ootd_error, OpenAIErrorCode};
use super::types::*;
use crate::config::ModuleSettings;
use crate::vision::VisionClient;

/// Base64 characters decoded to sniff the MIME type (48 bytes of header).
const MIME_SNIFF_CHARS: usize = 64;

/// MIME type used when neither sniffer recognises the payload.
const FALLBACK_MIME: &str = "image/jpeg";

/// OpenAI-compatible vision client.
pub struct OpenAiVisionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiVisionClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, model, VISION_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        info!(url = %base_url, model = %model, "Initializing OpenAI vision client");

        Ok(Self {
            client,
            base_url,
            model,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build from a vision module's settings.
    pub fn from_settings(settings: &ModuleSettings) -> Result<Self> {
        let base_url = settings.url.as_deref().unwrap_or(OPENAI_URL);
        let model = settings
            .model_name
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_VISION_MODEL);
        let client = Self::with_timeout(
            base_url,
            model,
            settings.timeout_secs.unwrap_or(VISION_TIMEOUT_SECS),
        )?;
        Ok(match settings.api_key() {
            Some(key) => client.with_api_key(key),
            None => client,
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }
}

/// Build a `data:<mime>;base64,<b64>` URL for an encoded image.
///
/// The MIME type comes from `infer`, then the signature table, then JPEG.
pub fn image_data_url(image_base64: &str) -> String {
    let prefix_len = image_base64.len().min(MIME_SNIFF_CHARS) / 4 * 4;
    let header = base64::engine::general_purpose::STANDARD
        .decode(&image_base64.as_bytes()[..prefix_len])
        .unwrap_or_default();

    let mime = infer::get(&header)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
        .or_else(|| ootd_core::detect(&header).map(|f| f.mime_type()))
        .unwrap_or(FALLBACK_MIME);

    format!("data:{};base64,{}", mime, image_base64)
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn respond(&self, question: &str, image_base64: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_with_image(
                question,
                image_data_url(image_base64),
            )],
            max_tokens: None,
            stream: false,
        };

        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (error_type, message) = match serde_json::from_str::<OpenAIErrorResponse>(&body) {
                Ok(parsed) => (
                    parsed.error.error_type.unwrap_or_default(),
                    parsed.error.message,
                ),
                Err(_) => (String::new(), body),
            };
            warn!(status = status.as_u16(), error = %message, "OpenAI vision request rejected");
            let code = OpenAIErrorCode::from_response(status.as_u16(), &error_type);
            return Err(to_ootd_error(
                code,
                &format!("{} returned {}: {}", self.base_url, status, message),
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse vision response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Inference("Vision model returned no content".to_string()))?;

        debug!(
            model = %self.model,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "OpenAI vision response"
        );
        Ok(content)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!("OpenAI vision health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI vision health check error: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

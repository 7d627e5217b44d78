//! Scripted vision client for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ootd_inference::mock::MockVisionClient;
//! use ootd_inference::VisionClient;
//!
//! #[tokio::test]
//! async fn test_with_mock_client() {
//!     let client = MockVisionClient::new().with_response("A person in a denim jacket");
//!     let text = client.respond("Describe", "aGVsbG8=").await.unwrap();
//!     assert_eq!(text, "A person in a denim jacket");
//!     assert_eq!(client.calls().len(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ootd_core::{Error, Result};

use crate::vision::VisionClient;

/// A recorded `respond` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub question: String,
    pub image_base64: String,
}

#[derive(Debug, Clone)]
enum Outcome {
    Respond(String),
    Fail(String),
}

/// Mock vision client that returns a fixed answer or a fixed failure.
#[derive(Debug, Clone)]
pub struct MockVisionClient {
    outcome: Outcome,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            outcome: Outcome::Respond("Mock description".to_string()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every question with `text`.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.outcome = Outcome::Respond(text.into());
        self
    }

    /// Fail every call with an inference error carrying `message`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    /// Calls recorded so far. Clones share the log.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn respond(&self, question: &str, image_base64: &str) -> Result<String> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                question: question.to_string(),
                image_base64: image_base64.to_string(),
            });
        }
        match &self.outcome {
            Outcome::Respond(text) => Ok(text.clone()),
            Outcome::Fail(message) => Err(Error::Inference(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

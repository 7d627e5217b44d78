//! OpenAI-compatible vision client.
//!
//! Works with any endpoint that accepts `image_url` content parts on
//! `/chat/completions`, including:
//!
//! - OpenAI cloud API
//! - Zhipu GLM-4V (`https://open.bigmodel.cn/api/paas/v4/`)
//! - Qwen-VL through DashScope compatibility mode
//! - vLLM and LM Studio
//!
//! # Example
//!
//! ```rust,no_run
//! use ootd_inference::openai::OpenAiVisionClient;
//! use ootd_inference::VisionClient;
//!
//! # async fn demo(image_base64: &str) -> ootd_core::Result<()> {
//! let client = OpenAiVisionClient::new("https://api.openai.com/v1", "gpt-4o-mini")?
//!     .with_api_key("sk-...");
//! let text = client.respond("Describe the person", image_base64).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::{image_data_url, OpenAiVisionClient};
pub use error::{to_ootd_error, OpenAIErrorCode};
pub use types::*;

//! # ootd-inference
//!
//! Vision model access and the outfit analysis pipeline for ootd.
//!
//! This crate provides:
//! - The pluggable [`VisionClient`] trait
//! - Ollama and OpenAI-compatible vision clients
//! - A registry mapping configured client types to constructors
//! - Vision module configuration and selection
//! - The [`OutfitAnalyzer`] that turns a stored image into a chat directive
//! - The `ootd` function-calling tool descriptor
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ootd_core::{ImageStore, VisionRequest};
//! use ootd_inference::{OutfitAnalyzer, VisionClientRegistry, VisionSettings};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = VisionSettings::load("config.yaml")?;
//! let analyzer = OutfitAnalyzer::new(
//!     ImageStore::new("data"),
//!     Arc::new(VisionClientRegistry::with_defaults()),
//! );
//! let request = VisionRequest::new("image_1700000000000_1a2b3c4d.jpg").with_scene_hint("job interview");
//! let directive = analyzer.analyze(&request, &settings).await;
//! println!("{:?}: {}", directive.action, directive.text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod openai;
pub mod outfit;
pub mod registry;
pub mod tool;
pub mod vision;

// Scripted client for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{
    resolve_vision_module, ConfigError, ConfigResult, ModuleSettings, VisionModule,
    VisionSettings,
};
pub use openai::OpenAiVisionClient;
pub use outfit::{OutfitAnalyzer, DEFAULT_SCENE};
pub use registry::{ClientConstructor, VisionClientRegistry};
pub use tool::ootd_tool_definition;
pub use vision::{OllamaVisionClient, VisionClient};

//! Centralized default constants for the ootd system.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// IMAGES
// =============================================================================

/// Maximum accepted image size in bytes (5 MiB), enforced at upload and again
/// before analysis.
pub const MAX_IMAGE_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Formats accepted by the validator, in the order they are listed to users.
pub const SUPPORTED_FORMATS_LABEL: &str = "JPEG, PNG, GIF, BMP, TIFF, WEBP";

/// Extension used when neither the declared filename nor the signature yields one.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Prefix for generated image filenames.
pub const IMAGE_FILENAME_PREFIX: &str = "image";

/// Number of random hex characters appended to generated filenames.
pub const IMAGE_FILENAME_RANDOM_HEX: usize = 8;

/// Multipart field name that marks the image part even without a filename.
pub const IMAGE_FIELD_NAME: &str = "image";

// =============================================================================
// STORAGE
// =============================================================================

/// Name of the flat directory holding uploaded images, relative to the project root.
pub const DATA_DIR_NAME: &str = "data";

/// Environment variable overriding the data directory location.
pub const ENV_DATA_DIR: &str = "OOTD_DATA_DIR";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8003;

/// Extra bytes allowed above the image limit for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Plain-text body returned by the upload liveness probe.
pub const UPLOAD_PROBE_TEXT: &str = "Image upload endpoint is running";

/// Generic message returned for server-class upload failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Environment variable naming the YAML configuration file.
pub const ENV_CONFIG_PATH: &str = "OOTD_CONFIG";

/// Default configuration file path.
pub const CONFIG_PATH: &str = "config.yaml";

/// Environment variable overriding the default answer language.
pub const ENV_DEFAULT_LANG: &str = "OOTD_DEFAULT_LANG";

/// Default answer language for vision questions and guidance.
pub const DEFAULT_LANG: &str = "en_US";

/// Key under `selected_module` naming the active vision module.
pub const VISION_MODULE_KEY: &str = "VLLM";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default OpenAI-compatible base URL.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default vision model for the Ollama client.
pub const DEFAULT_OLLAMA_VISION_MODEL: &str = "qwen3-vl:8b";

/// Default vision model for the OpenAI-compatible client.
pub const DEFAULT_OPENAI_VISION_MODEL: &str = "gpt-4o-mini";

/// Timeout for vision requests in seconds.
pub const VISION_TIMEOUT_SECS: u64 = 120;

/// Timeout for vision health checks in seconds.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

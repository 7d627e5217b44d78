//! Structured logging schema for ootd.
//!
//! `tracing` macros take field names as literal identifiers, so call sites
//! spell these names directly; this module is the list log aggregation can
//! rely on. Every name here is emitted by at least one crate.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Failed upload or analysis, requires operator attention |
//! | WARN  | Rejected input, recoverable issue |
//! | INFO  | Lifecycle events (startup), stored images, completed analyses |
//! | DEBUG | Decision points, resolved configuration, request sizes |

// ─── Origin fields ─────────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "upload", "outfit"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "analyze"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Stored image file name.
pub const FILE_NAME: &str = "file_name";

/// Absolute path of a stored image.
pub const SAVE_PATH: &str = "save_path";

/// Detected image format.
pub const IMAGE_FORMAT: &str = "format";

/// Vision module name from configuration.
pub const MODULE: &str = "module";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of an image payload.
pub const SIZE_BYTES: &str = "size_bytes";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Vision client type identifier.
pub const CLIENT_TYPE: &str = "client_type";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

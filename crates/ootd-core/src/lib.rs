//! # ootd-core
//!
//! Core types and primitives shared by the ootd crates.
//!
//! This crate provides the error type, the shared defaults, the magic-byte
//! signature sniffer, the image validator, the data model, and the flat
//! data-directory image store.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod signature;
pub mod storage;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use signature::{detect, ImageFormat};
pub use storage::ImageStore;
pub use validation::{is_valid_image, validate_image, ImageError};

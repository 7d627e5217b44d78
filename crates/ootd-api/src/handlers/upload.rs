//! Image upload HTTP handlers.
//!
//! Accepts a multipart image, validates it by size and signature, and stores
//! it under a generated name in the data directory. The returned filename is
//! what later analysis requests refer to.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use ootd_core::defaults::{IMAGE_FIELD_NAME, UPLOAD_PROBE_TEXT};
use ootd_core::validate_image;

use crate::{ApiError, AppState};

/// Multipart form accepted by the upload endpoint.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadImageForm {
    /// Image file (JPEG, PNG, GIF, BMP, TIFF, or WEBP), at most 5MB.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Response from a successful upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadImageResponse {
    /// Always `true`.
    pub success: bool,
    /// Generated name, `image_<epoch_millis>_<8 hex>.<ext>`.
    pub filename: String,
    /// Path relative to the project root, `data/<filename>`.
    pub path: String,
}

/// Upload an image.
///
/// Accepts multipart/form-data. The first part that declares a filename or is
/// named `image` is taken as the image; other parts are ignored.
///
/// # Returns
/// - 200 OK with the generated filename and its relative path
/// - 400 Bad Request if the body is not multipart, no image part is present,
///   or the image is empty, larger than 5MB, or not a supported format
/// - 500 Internal Server Error if the image could not be stored
#[utoipa::path(post, path = "/api/v1/images", tag = "Images",
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Missing, empty, oversized, or unsupported image", body = crate::error::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::error::ErrorBody),
    ))]
pub async fn upload_image(
    State(state): State<AppState>,
    payload: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut multipart = payload.map_err(|e| {
        ApiError::BadRequest(format!("malformed multipart payload: {}", e.body_text()))
    })?;
    let mut image: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|n| n.to_string());
        let declared_filename = field.file_name().map(|f| f.to_string());

        if declared_filename.is_none() && field_name.as_deref() != Some(IMAGE_FIELD_NAME) {
            debug!(field = ?field_name, "Skipping non-image multipart field");
            continue;
        }

        let data = field.bytes().await?.to_vec();
        image = Some((declared_filename, data));
        break;
    }

    let (declared_filename, data) = image.ok_or_else(|| {
        ApiError::BadRequest(format!(
            "no image file found, upload it with the form field '{}'",
            IMAGE_FIELD_NAME
        ))
    })?;

    let format = validate_image(&data)?;
    let stored = state
        .store
        .save(&data, declared_filename.as_deref())
        .await?;

    info!(
        subsystem = "api",
        component = "upload",
        file_name = %stored.filename,
        size_bytes = stored.size_bytes,
        format = %format,
        "Image upload accepted"
    );

    Ok(Json(UploadImageResponse {
        success: true,
        filename: stored.filename,
        path: stored.relative_path,
    }))
}

/// Liveness probe for the upload endpoint.
#[utoipa::path(get, path = "/api/v1/images", tag = "Images",
    responses((status = 200, description = "Endpoint is running", body = String)))]
pub async fn upload_probe() -> &'static str {
    UPLOAD_PROBE_TEXT
}

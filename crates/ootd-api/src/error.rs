//! HTTP error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use ootd_core::defaults::{INTERNAL_ERROR_MESSAGE, MAX_IMAGE_SIZE_BYTES};
use ootd_core::ImageError;

/// Error body shared by the API's endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    pub message: String,
}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The caller's request or payload was unusable (400).
    BadRequest(String),
    /// Anything else (500). The detail is logged, never returned.
    Internal(String),
}

impl From<ootd_core::Error> for ApiError {
    fn from(err: ootd_core::Error) -> Self {
        use ootd_core::Error;
        match err {
            Error::InvalidInput(msg) | Error::InvalidContent(msg) | Error::NotFound(msg) => {
                ApiError::BadRequest(msg)
            }
            Error::Config(_)
            | Error::Inference(_)
            | Error::Request(_)
            | Error::Serialization(_)
            | Error::Internal(_)
            | Error::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ImageError::TooLarge {
                size: MAX_IMAGE_SIZE_BYTES + 1,
                limit: MAX_IMAGE_SIZE_BYTES,
            }
            .into();
        }
        ApiError::BadRequest(format!("malformed multipart payload: {}", err.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        for err in [
            ootd_core::Error::InvalidInput("x".into()),
            ootd_core::Error::InvalidContent("x".into()),
            ootd_core::Error::NotFound("x".into()),
        ] {
            assert!(matches!(ApiError::from(err), ApiError::BadRequest(m) if m == "x"));
        }
    }

    #[test]
    fn test_server_errors_map_to_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(matches!(
            ApiError::from(ootd_core::Error::Io(io)),
            ApiError::Internal(m) if m.contains("disk full")
        ));
        assert!(matches!(
            ApiError::from(ootd_core::Error::Config("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_internal_status_hides_detail() {
        let response = ApiError::Internal("secret path /srv/data".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_status() {
        let response = ApiError::from(ImageError::Empty).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

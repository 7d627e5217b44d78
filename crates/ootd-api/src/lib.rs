//! ootd-api - HTTP API for image intake and outfit guidance.
//!
//! The binary in `main.rs` wires configuration and logging; everything that
//! serves requests lives here so tests can build the same router.

pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use ootd_core::defaults::{CORS_MAX_AGE_SECS, MAX_IMAGE_SIZE_BYTES, MULTIPART_OVERHEAD_BYTES};

pub use error::ApiError;
pub use state::AppState;

/// Largest request body accepted: one maximum-size image plus multipart framing.
pub const MAX_REQUEST_BODY_BYTES: usize = MAX_IMAGE_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// OpenAPI document served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ootd API",
        description = "Image intake and outfit guidance from vision model descriptions"
    ),
    paths(
        handlers::upload::upload_image,
        handlers::upload::upload_probe,
        handlers::ootd::analyze_outfit,
        handlers::ootd::list_tools,
        handlers::messages::post_message,
    ),
    components(schemas(
        handlers::upload::UploadImageForm,
        handlers::upload::UploadImageResponse,
        handlers::ootd::OotdRequest,
        handlers::ootd::OotdResponse,
        chat::ImageMessage,
        error::ErrorBody,
    )),
    tags(
        (name = "Images", description = "Image upload"),
        (name = "Outfit", description = "Outfit analysis"),
        (name = "Chat", description = "Chat message handling")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = config::parse_allowed_origins(allowed_origins);
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static("x-request-id")])
        .max_age(std::time::Duration::from_secs(CORS_MAX_AGE_SECS))
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        // Image intake (the short alias matches older clients)
        .route(
            "/api/v1/images",
            post(handlers::upload::upload_image).get(handlers::upload::upload_probe),
        )
        .route(
            "/upload/image",
            post(handlers::upload::upload_image).get(handlers::upload::upload_probe),
        )
        // Outfit analysis
        .route("/api/v1/ootd", post(handlers::ootd::analyze_outfit))
        .route("/api/v1/tools", get(handlers::ootd::list_tools))
        // Chat messages
        .route("/api/v1/messages", post(handlers::messages::post_message))
        // Docs
        .route("/openapi.json", get(openapi_json))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        // Overflow surfaces as a multipart error and is reported as a JSON 400
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

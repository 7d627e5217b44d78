//! Outfit analysis HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ootd_core::{GuidanceAction, GuidanceDirective, VisionRequest};
use ootd_inference::ootd_tool_definition;

use crate::{ApiError, AppState};

/// Request body for outfit analysis.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OotdRequest {
    /// Filename returned by the upload endpoint.
    pub file_name: String,
    /// Scene or occasion, e.g. "job interview".
    #[serde(default)]
    pub status: Option<String>,
    /// Answer language, e.g. "en_US". Defaults to the server's language.
    #[serde(default)]
    pub lang: Option<String>,
}

impl From<OotdRequest> for VisionRequest {
    fn from(req: OotdRequest) -> Self {
        VisionRequest {
            file_name: req.file_name,
            scene_hint: req.status,
            lang: req.lang,
        }
    }
}

/// Directive returned to the chat engine.
#[derive(Debug, Serialize, ToSchema)]
pub struct OotdResponse {
    /// `CONTINUE_CHAT` to feed `text` to the language model, `RESPOND_ERROR`
    /// to reply with it directly.
    pub action: String,
    pub text: String,
}

impl From<GuidanceDirective> for OotdResponse {
    fn from(directive: GuidanceDirective) -> Self {
        let action = match directive.action {
            GuidanceAction::ContinueChat => "CONTINUE_CHAT",
            GuidanceAction::RespondError => "RESPOND_ERROR",
        };
        Self {
            action: action.to_string(),
            text: directive.text,
        }
    }
}

/// Analyze a stored image and build the outfit guidance prompt.
///
/// Pipeline failures (missing file, invalid image, unconfigured or failing
/// vision model) still return 200 with a `RESPOND_ERROR` directive; only a
/// malformed request body is a 400.
#[utoipa::path(post, path = "/api/v1/ootd", tag = "Outfit",
    request_body = OotdRequest,
    responses(
        (status = 200, description = "Guidance directive", body = OotdResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ErrorBody),
    ))]
pub async fn analyze_outfit(
    State(state): State<AppState>,
    payload: Result<Json<OotdRequest>, JsonRejection>,
) -> Result<Json<OotdResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = VisionRequest::from(body);

    let directive = state
        .analyzer
        .analyze(&request, &state.vision_settings)
        .await;

    Ok(Json(directive.into()))
}

/// Function-calling tools the chat engine can offer its model.
#[utoipa::path(get, path = "/api/v1/tools", tag = "Outfit",
    responses((status = 200, description = "OpenAI-style tool descriptors")))]
pub async fn list_tools() -> Json<serde_json::Value> {
    Json(serde_json::Value::Array(vec![ootd_tool_definition()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_status_to_scene_hint() {
        let body: OotdRequest = serde_json::from_str(
            r#"{"file_name": "image_1_abcdef01.png", "status": "wedding", "lang": "zh_CN"}"#,
        )
        .unwrap();
        let request = VisionRequest::from(body);
        assert_eq!(request.file_name, "image_1_abcdef01.png");
        assert_eq!(request.scene_hint.as_deref(), Some("wedding"));
        assert_eq!(request.lang.as_deref(), Some("zh_CN"));
    }

    #[test]
    fn test_response_action_names() {
        let ok: OotdResponse = GuidanceDirective::continue_chat("t").into();
        assert_eq!(ok.action, "CONTINUE_CHAT");
        let err: OotdResponse = GuidanceDirective::respond_error("t").into();
        assert_eq!(err.action, "RESPOND_ERROR");
    }
}

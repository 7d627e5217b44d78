//! Chat message HTTP handler.
//!
//! Runs one incoming chat message through the same handlers a live
//! connection uses and returns the events the conversation would receive.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use ootd_core::VisionRequest;
use ootd_inference::tool::OOTD_TOOL_NAME;

use crate::chat::{dispatch_directive, ImageMessage, OutboundEvent, RecordingSession};
use crate::{ApiError, AppState};

/// Model-issued call of a function-calling tool.
#[derive(Debug, Deserialize)]
pub struct ToolCallMessage {
    pub name: String,
    /// Tool arguments, as an object or as a JSON-encoded string.
    #[serde(default)]
    pub arguments: Value,
}

/// Events produced while handling a message, in order.
#[derive(Debug, Serialize)]
pub struct MessageEventsResponse {
    pub events: Vec<OutboundEvent>,
}

/// Handle a chat message.
///
/// Supported message types:
/// - `image`: `{"type": "image", "file_name", "status"?, "question"?}`
/// - `tool_call`: `{"type": "tool_call", "name": "ootd", "arguments": {...}}`
#[utoipa::path(post, path = "/api/v1/messages", tag = "Chat",
    request_body(content = ImageMessage, description = "Chat message; `type` selects the handler"),
    responses(
        (status = 200, description = "Events produced for the conversation"),
        (status = 400, description = "Malformed or unsupported message", body = crate::error::ErrorBody),
    ))]
pub async fn post_message(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageEventsResponse>, ApiError> {
    let Json(message) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let message_type = message
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("message type is required".to_string()))?
        .to_string();
    debug!(message_type = %message_type, "Handling chat message");

    let session = RecordingSession::new();
    match message_type.as_str() {
        "image" => {
            let image: ImageMessage = parse(message)?;
            state.image_messages.handle(&session, &image).await;
        }
        "tool_call" => {
            let call: ToolCallMessage = parse(message)?;
            if call.name != OOTD_TOOL_NAME {
                return Err(ApiError::BadRequest(format!("unknown tool '{}'", call.name)));
            }
            let request = tool_arguments(call.arguments)?;
            let directive = state
                .analyzer
                .analyze(&request, &state.vision_settings)
                .await;
            dispatch_directive(&session, &directive).await?;
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "unsupported message type '{}'",
                other
            )));
        }
    }

    Ok(Json(MessageEventsResponse {
        events: session.into_events(),
    }))
}

fn parse<T: serde::de::DeserializeOwned>(message: Value) -> Result<T, ApiError> {
    serde_json::from_value(message)
        .map_err(|e| ApiError::BadRequest(format!("invalid message: {}", e)))
}

/// Decode `ootd` tool arguments into a vision request.
fn tool_arguments(arguments: Value) -> Result<VisionRequest, ApiError> {
    let arguments = match arguments {
        Value::String(encoded) => serde_json::from_str(&encoded)
            .map_err(|e| ApiError::BadRequest(format!("invalid tool arguments: {}", e)))?,
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ApiError::BadRequest(format!("invalid tool arguments: {}", e)))
}

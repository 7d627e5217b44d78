//! Data model for image intake and outfit analysis.

use serde::{Deserialize, Serialize};

/// An image persisted under the data directory by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    /// Generated name, `image_<epoch_millis>_<8 hex>.<ext>`.
    pub filename: String,
    /// Path relative to the project root, `data/<filename>`.
    pub relative_path: String,
    pub size_bytes: u64,
}

/// Request to analyze a stored image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionRequest {
    /// Name of a file inside the data directory.
    pub file_name: String,
    /// Scene or occasion the outfit is for (e.g. "job interview").
    #[serde(default, alias = "status", skip_serializing_if = "Option::is_none")]
    pub scene_hint: Option<String>,
    /// Answer language, e.g. "en_US" or "zh_CN".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl VisionRequest {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_scene_hint(mut self, scene: impl Into<String>) -> Self {
        self.scene_hint = Some(scene.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

/// Description returned by a vision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionResult {
    pub description: String,
}

/// What the chat engine should do with a directive's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuidanceAction {
    /// Feed the text to the language model as the next conversation turn.
    ContinueChat,
    /// Reply to the user directly with the text.
    RespondError,
}

/// Output of the outfit analysis pipeline, handed to the chat dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceDirective {
    pub action: GuidanceAction,
    pub text: String,
}

impl GuidanceDirective {
    pub fn continue_chat(text: impl Into<String>) -> Self {
        Self {
            action: GuidanceAction::ContinueChat,
            text: text.into(),
        }
    }

    pub fn respond_error(text: impl Into<String>) -> Self {
        Self {
            action: GuidanceAction::RespondError,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.action == GuidanceAction::RespondError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_action_wire_names() {
        let json = serde_json::to_value(GuidanceDirective::continue_chat("go")).unwrap();
        assert_eq!(json["action"], "CONTINUE_CHAT");
        assert_eq!(json["text"], "go");

        let json = serde_json::to_value(GuidanceDirective::respond_error("no")).unwrap();
        assert_eq!(json["action"], "RESPOND_ERROR");
    }

    #[test]
    fn test_vision_request_accepts_status_alias() {
        let json = r#"{"file_name": "image_1_abcdef01.png", "status": "job interview"}"#;
        let req: VisionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.file_name, "image_1_abcdef01.png");
        assert_eq!(req.scene_hint.as_deref(), Some("job interview"));
        assert!(req.lang.is_none());
    }

    #[test]
    fn test_vision_request_minimal() {
        let req: VisionRequest = serde_json::from_str(r#"{"file_name": "a.png"}"#).unwrap();
        assert_eq!(req, VisionRequest::new("a.png"));
    }

    #[test]
    fn test_vision_request_builder() {
        let req = VisionRequest::new("a.jpg")
            .with_scene_hint("wedding")
            .with_lang("zh_CN");
        assert_eq!(req.scene_hint.as_deref(), Some("wedding"));
        assert_eq!(req.lang.as_deref(), Some("zh_CN"));
    }

    #[test]
    fn test_directive_is_error() {
        assert!(GuidanceDirective::respond_error("x").is_error());
        assert!(!GuidanceDirective::continue_chat("x").is_error());
    }
}

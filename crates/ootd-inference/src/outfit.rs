//! Outfit analysis pipeline.
//!
//! Reads a stored image, has the configured vision model describe the person
//! in it, and folds the description and the scene into a guidance prompt for
//! the chat engine. The pipeline never fails outward: every error becomes a
//! [`GuidanceDirective`] the chat engine replies with directly.

use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use tracing::{debug, error, info};

use ootd_core::defaults::DEFAULT_LANG;
use ootd_core::{
    validate_image, Error, GuidanceDirective, ImageStore, Result, VisionRequest, VisionResult,
};

use crate::config::{resolve_vision_module, VisionSettings};
use crate::registry::VisionClientRegistry;

/// Scene used when the caller gives none.
pub const DEFAULT_SCENE: &str = "daily commute/outing (no specific scene provided)";

/// Prefix of every error directive's text.
pub const FAILURE_PREFIX: &str = "generation failed: ";

const DESCRIBE_PERSON_QUESTION: &str = "Describe the person in the image in detail, \
focusing only on the person: gender presentation, age bracket, body shape, garments, \
colours, and style. Do not describe the background or anything unrelated to the person.";

/// Question sent to the vision model.
pub fn describe_question(lang: &str) -> String {
    format!("{} Please answer in {}.", DESCRIBE_PERSON_QUESTION, lang)
}

/// Guidance prompt handed to the chat engine.
pub fn guidance_prompt(lang: &str, description: &str, scene: &str) -> String {
    format!(
        "Using {}, give actionable outfit advice based on the following description \
of the person and the scene:\n\n[Appearance] {}\n\n[Scene] {}\n\n",
        lang, description, scene
    )
}

/// Base64-encode image bytes (standard alphabet, padded).
pub fn encode_image(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// User-facing cause for a failed analysis.
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::InvalidInput(msg) => format!("invalid request: {}", msg),
        Error::NotFound(msg) => format!("file not found: {}", msg),
        Error::InvalidContent(msg) => msg.clone(),
        Error::Config(msg) => format!("vision module is not configured correctly: {}", msg),
        Error::Inference(msg) | Error::Request(msg) => {
            format!("vision model call failed: {}", msg)
        }
        Error::Serialization(msg) => format!("vision model response was unreadable: {}", msg),
        Error::Internal(msg) => msg.clone(),
        Error::Io(e) => format!("could not read image: {}", e),
    }
}

/// Orchestrates image description and guidance prompt construction.
#[derive(Debug, Clone)]
pub struct OutfitAnalyzer {
    store: ImageStore,
    registry: Arc<VisionClientRegistry>,
    default_lang: String,
}

impl OutfitAnalyzer {
    pub fn new(store: ImageStore, registry: Arc<VisionClientRegistry>) -> Self {
        Self {
            store,
            registry,
            default_lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Language used when a request does not name one.
    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Run the full pipeline. Failures come back as `RESPOND_ERROR` directives.
    pub async fn analyze(
        &self,
        request: &VisionRequest,
        settings: &VisionSettings,
    ) -> GuidanceDirective {
        let start = Instant::now();
        let lang = self.lang_for(request);

        match self.describe(request, settings).await {
            Ok(result) => {
                let scene = request
                    .scene_hint
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_SCENE);
                info!(
                    subsystem = "inference",
                    component = "outfit",
                    op = "analyze",
                    file_name = %request.file_name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Outfit analysis complete, guidance prompt ready"
                );
                GuidanceDirective::continue_chat(guidance_prompt(lang, &result.description, scene))
            }
            Err(e) => {
                error!(
                    subsystem = "inference",
                    component = "outfit",
                    op = "analyze",
                    file_name = %request.file_name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Outfit analysis failed"
                );
                GuidanceDirective::respond_error(format!("{}{}", FAILURE_PREFIX, failure_message(&e)))
            }
        }
    }

    /// Read, re-validate, and describe the stored image.
    pub async fn describe(
        &self,
        request: &VisionRequest,
        settings: &VisionSettings,
    ) -> Result<VisionResult> {
        let image_base64 = self.read_image_base64(&request.file_name).await?;

        let module = resolve_vision_module(settings)?;
        let client = self
            .registry
            .construct(&module.client_type, &module.settings)?;

        debug!(
            module = %module.name,
            client_type = %module.client_type,
            model = client.model_name(),
            "Describing image"
        );
        let question = describe_question(self.lang_for(request));
        let description = client.respond(&question, &image_base64).await?;

        Ok(VisionResult { description })
    }

    /// Build the configured client and ask whether its service is reachable.
    pub async fn check_vision_service(&self, settings: &VisionSettings) -> Result<bool> {
        let module = resolve_vision_module(settings)?;
        let client = self
            .registry
            .construct(&module.client_type, &module.settings)?;
        let healthy = client.health_check().await?;
        debug!(module = %module.name, model = client.model_name(), healthy, "Vision service checked");
        Ok(healthy)
    }

    /// Read a stored image and apply the upload-time checks again before encoding.
    async fn read_image_base64(&self, file_name: &str) -> Result<String> {
        if file_name.trim().is_empty() {
            return Err(Error::InvalidInput("file_name is required".to_string()));
        }
        let data = self.store.read(file_name).await?;
        let format = validate_image(&data)?;
        debug!(file_name, size_bytes = data.len(), format = %format, "Image re-validated");
        Ok(encode_image(&data))
    }

    fn lang_for<'a>(&'a self, request: &'a VisionRequest) -> &'a str {
        request
            .lang
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleSettings;
    use crate::mock::MockVisionClient;
    use crate::vision::VisionClient;
    use ootd_core::defaults::MAX_IMAGE_SIZE_BYTES;
    use ootd_core::GuidanceAction;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01";
    const DESCRIPTION: &str = "A young man, slim build, wearing a navy blazer and white sneakers";

    struct Fixture {
        _dir: TempDir,
        analyzer: OutfitAnalyzer,
        client: MockVisionClient,
    }

    fn fixture_with(client: MockVisionClient) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());
        let mut registry = VisionClientRegistry::with_defaults();
        let shared = client.clone();
        registry.register("stub", move |_| {
            Ok(Arc::new(shared.clone()) as Arc<dyn VisionClient>)
        });
        Fixture {
            _dir: dir,
            analyzer: OutfitAnalyzer::new(store, Arc::new(registry)),
            client,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockVisionClient::new().with_response(DESCRIPTION))
    }

    fn stub_settings() -> VisionSettings {
        VisionSettings::single(
            "StubVLLM",
            ModuleSettings {
                client_type: Some("stub".to_string()),
                ..Default::default()
            },
        )
    }

    fn write(f: &Fixture, name: &str, data: &[u8]) {
        std::fs::write(f.analyzer.store().data_dir().join(name), data).unwrap();
    }

    fn assert_error(directive: &GuidanceDirective, needle: &str) {
        assert_eq!(directive.action, GuidanceAction::RespondError);
        assert!(
            directive.text.starts_with(FAILURE_PREFIX),
            "unexpected text {:?}",
            directive.text
        );
        assert!(
            directive.text.contains(needle),
            "{:?} does not mention {:?}",
            directive.text,
            needle
        );
    }

    #[tokio::test]
    async fn test_guidance_contains_description_and_scene() {
        let f = fixture();
        write(&f, "image_1_aaaaaaaa.png", PNG);

        let request = VisionRequest::new("image_1_aaaaaaaa.png").with_scene_hint("job interview");
        let directive = f.analyzer.analyze(&request, &stub_settings()).await;

        assert_eq!(directive.action, GuidanceAction::ContinueChat);
        assert!(directive.text.contains(DESCRIPTION));
        assert!(directive.text.contains("[Scene] job interview"));
        assert!(directive.text.starts_with("Using en_US,"));
    }

    #[tokio::test]
    async fn test_missing_scene_uses_default_phrase() {
        let f = fixture();
        write(&f, "a.png", PNG);

        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("a.png"), &stub_settings())
            .await;
        assert_eq!(directive.action, GuidanceAction::ContinueChat);
        assert!(directive.text.contains(DEFAULT_SCENE));

        let blank = VisionRequest::new("a.png").with_scene_hint("   ");
        let directive = f.analyzer.analyze(&blank, &stub_settings()).await;
        assert!(directive.text.contains(DEFAULT_SCENE));
    }

    #[tokio::test]
    async fn test_client_receives_question_and_encoded_image() {
        let f = fixture();
        write(&f, "a.png", PNG);

        let request = VisionRequest::new("a.png").with_lang("zh_CN");
        let directive = f.analyzer.analyze(&request, &stub_settings()).await;
        assert!(directive.text.starts_with("Using zh_CN,"));

        let calls = f.client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].image_base64, encode_image(PNG));
        assert!(calls[0].question.contains("Do not describe the background"));
        assert!(calls[0].question.ends_with("Please answer in zh_CN."));
    }

    #[tokio::test]
    async fn test_default_lang_override() {
        let f = fixture();
        write(&f, "a.png", PNG);
        let analyzer = f.analyzer.clone().with_default_lang("ja_JP");

        let directive = analyzer
            .analyze(&VisionRequest::new("a.png").with_lang(""), &stub_settings())
            .await;
        assert!(directive.text.starts_with("Using ja_JP,"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error_directive() {
        let f = fixture();
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("image_0_deadbeef.jpg"), &stub_settings())
            .await;
        assert_error(&directive, "file not found: image_0_deadbeef.jpg");
        assert!(f.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_path_traversal_is_not_found() {
        let f = fixture();
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("../secret.png"), &stub_settings())
            .await;
        assert_error(&directive, "file not found");
    }

    #[tokio::test]
    async fn test_blank_file_name_is_invalid_request() {
        let f = fixture();
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new(" "), &stub_settings())
            .await;
        assert_error(&directive, "file_name is required");
    }

    #[tokio::test]
    async fn test_zero_byte_file_is_empty_content() {
        let f = fixture();
        write(&f, "empty.png", b"");
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("empty.png"), &stub_settings())
            .await;
        assert_error(&directive, "image data is empty");
        assert!(f.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_again() {
        let f = fixture();
        let mut data = PNG.to_vec();
        data.resize(MAX_IMAGE_SIZE_BYTES + 1, 0);
        write(&f, "big.png", &data);

        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("big.png"), &stub_settings())
            .await;
        assert_error(&directive, "5MB");
    }

    #[tokio::test]
    async fn test_substituted_content_is_rejected() {
        let f = fixture();
        write(&f, "image_1_aaaaaaaa.png", b"#!/bin/sh\necho not an image\n");
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("image_1_aaaaaaaa.png"), &stub_settings())
            .await;
        assert_error(&directive, "unsupported file format");
    }

    #[tokio::test]
    async fn test_no_vision_module_is_error_directive() {
        let f = fixture();
        write(&f, "a.png", PNG);
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("a.png"), &VisionSettings::default())
            .await;
        assert_error(&directive, "no default vision module has been selected");
    }

    #[tokio::test]
    async fn test_file_checked_before_configuration() {
        let f = fixture();
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("gone.png"), &VisionSettings::default())
            .await;
        assert_error(&directive, "file not found");
    }

    #[tokio::test]
    async fn test_unknown_client_type_is_error_directive() {
        let f = fixture();
        write(&f, "a.png", PNG);
        let settings = VisionSettings::single("MysteryVLLM", ModuleSettings::default());
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("a.png"), &settings)
            .await;
        assert_error(&directive, "unsupported vision client type 'MysteryVLLM'");
    }

    #[tokio::test]
    async fn test_model_failure_is_error_directive() {
        let f = fixture_with(MockVisionClient::new().with_error("connection reset"));
        write(&f, "a.png", PNG);
        let directive = f
            .analyzer
            .analyze(&VisionRequest::new("a.png"), &stub_settings())
            .await;
        assert_error(&directive, "vision model call failed: connection reset");
    }

    #[tokio::test]
    async fn test_describe_returns_vision_result() {
        let f = fixture();
        write(&f, "a.png", PNG);
        let result = f
            .analyzer
            .describe(&VisionRequest::new("a.png"), &stub_settings())
            .await
            .unwrap();
        assert_eq!(result.description, DESCRIPTION);
    }

    #[test]
    fn test_failure_message_covers_every_category() {
        let cases = [
            (Error::InvalidInput("x".into()), "invalid request: x"),
            (Error::NotFound("x".into()), "file not found: x"),
            (Error::InvalidContent("x".into()), "x"),
            (Error::Inference("x".into()), "vision model call failed: x"),
            (Error::Request("x".into()), "vision model call failed: x"),
            (Error::Internal("x".into()), "x"),
        ];
        for (err, expected) in cases {
            assert_eq!(failure_message(&err), expected);
        }
        assert!(failure_message(&Error::Config("x".into())).ends_with(": x"));
        assert!(failure_message(&Error::Serialization("x".into())).ends_with(": x"));
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(failure_message(&io).contains("denied"));
    }

    #[test]
    fn test_guidance_prompt_layout() {
        let text = guidance_prompt("en_US", "desc", "wedding");
        assert_eq!(
            text,
            "Using en_US, give actionable outfit advice based on the following description \
of the person and the scene:\n\n[Appearance] desc\n\n[Scene] wedding\n\n"
        );
    }

    #[tokio::test]
    async fn test_check_vision_service_uses_selected_client() {
        let f = fixture();
        assert!(f.analyzer.check_vision_service(&stub_settings()).await.unwrap());
    }

    #[tokio::test]
    async fn test_check_vision_service_without_module_is_config_error() {
        let f = fixture();
        let err = f
            .analyzer
            .check_vision_service(&VisionSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

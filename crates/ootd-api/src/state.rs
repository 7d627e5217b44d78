//! Application state shared across handlers.

use std::sync::Arc;

use ootd_core::ImageStore;
use ootd_inference::{OutfitAnalyzer, VisionClientRegistry, VisionSettings};

use crate::chat::ImageMessageHandler;

/// Immutable state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Image store rooted at the data directory.
    pub store: ImageStore,
    /// Outfit analysis pipeline.
    pub analyzer: OutfitAnalyzer,
    /// Vision configuration snapshot loaded at startup.
    pub vision_settings: Arc<VisionSettings>,
    /// Handler for `image` chat messages.
    pub image_messages: Arc<ImageMessageHandler>,
}

impl AppState {
    pub fn new(
        store: ImageStore,
        registry: Arc<VisionClientRegistry>,
        vision_settings: VisionSettings,
        default_lang: impl Into<String>,
    ) -> Self {
        let analyzer = OutfitAnalyzer::new(store.clone(), registry).with_default_lang(default_lang);
        Self {
            store,
            analyzer,
            vision_settings: Arc::new(vision_settings),
            image_messages: Arc::new(ImageMessageHandler::new()),
        }
    }
}

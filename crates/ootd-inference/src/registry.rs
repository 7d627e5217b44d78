//! Registry of vision client constructors keyed by client type.
//!
//! The registry replaces dynamic type lookup with an explicit map, so an
//! unknown `type` in the configuration surfaces as a configuration error
//! naming the types that are available.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ootd_core::{Error, Result};
use tracing::debug;

use crate::config::ModuleSettings;
use crate::openai::OpenAiVisionClient;
use crate::vision::{OllamaVisionClient, VisionClient};

/// Builds a vision client from a module's settings.
pub type ClientConstructor =
    Arc<dyn Fn(&ModuleSettings) -> Result<Arc<dyn VisionClient>> + Send + Sync>;

/// Client type identifier for OpenAI-compatible services.
pub const OPENAI_TYPE: &str = "openai";

/// Client type identifier for Ollama.
pub const OLLAMA_TYPE: &str = "ollama";

/// Map from client type to constructor.
#[derive(Clone)]
pub struct VisionClientRegistry {
    constructors: HashMap<String, ClientConstructor>,
}

impl VisionClientRegistry {
    /// Registry with no client types.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with the built-in `openai` and `ollama` clients.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(OPENAI_TYPE, |settings| {
            Ok(Arc::new(OpenAiVisionClient::from_settings(settings)?) as Arc<dyn VisionClient>)
        });
        registry.register(OLLAMA_TYPE, |settings| {
            Ok(Arc::new(OllamaVisionClient::from_settings(settings)?) as Arc<dyn VisionClient>)
        });
        registry
    }

    /// Register a constructor, replacing any existing one for the type.
    pub fn register<F>(&mut self, client_type: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ModuleSettings) -> Result<Arc<dyn VisionClient>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(normalize(client_type), Arc::new(constructor));
        self
    }

    pub fn contains(&self, client_type: &str) -> bool {
        self.constructors.contains_key(&normalize(client_type))
    }

    /// Registered type identifiers, sorted.
    pub fn known_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Construct a client of the given type.
    pub fn construct(
        &self,
        client_type: &str,
        settings: &ModuleSettings,
    ) -> Result<Arc<dyn VisionClient>> {
        let constructor = self.constructors.get(&normalize(client_type)).ok_or_else(|| {
            Error::Config(format!(
                "unsupported vision client type '{}' (known types: {})",
                client_type,
                self.known_types().join(", ")
            ))
        })?;
        let client = constructor(settings)?;
        debug!(client_type, model = client.model_name(), "Constructed vision client");
        Ok(client)
    }
}

impl Default for VisionClientRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for VisionClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionClientRegistry")
            .field("types", &self.known_types())
            .finish()
    }
}

fn normalize(client_type: &str) -> String {
    client_type.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVisionClient;

    #[test]
    fn test_defaults_know_openai_and_ollama() {
        let registry = VisionClientRegistry::with_defaults();
        assert_eq!(registry.known_types(), vec!["ollama", "openai"]);
    }

    #[test]
    fn test_construct_ollama() {
        let registry = VisionClientRegistry::with_defaults();
        let settings = ModuleSettings {
            model_name: Some("llava".to_string()),
            ..Default::default()
        };
        let client = registry.construct("ollama", &settings).unwrap();
        assert_eq!(client.model_name(), "llava");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = VisionClientRegistry::with_defaults();
        assert!(registry.contains("OpenAI"));
        assert!(registry.construct(" OLLAMA ", &ModuleSettings::default()).is_ok());
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let registry = VisionClientRegistry::with_defaults();
        let err = registry
            .construct("ChatGLMVLLM", &ModuleSettings::default())
            .err()
            .unwrap();
        match err {
            Error::Config(msg) => {
                assert!(msg.contains("ChatGLMVLLM"));
                assert!(msg.contains("ollama, openai"));
            }
            other => panic!("Expected Config, got {:?}", other),
        }
    }

    #[test]
    fn test_register_custom_type() {
        let mut registry = VisionClientRegistry::empty();
        registry.register("stub", |_| {
            Ok(Arc::new(MockVisionClient::new().with_response("stubbed")) as Arc<dyn VisionClient>)
        });
        assert_eq!(registry.known_types(), vec!["stub"]);
        let client = registry.construct("stub", &ModuleSettings::default()).unwrap();
        assert_eq!(client.model_name(), "mock-vision");
    }

    #[test]
    fn test_constructor_error_propagates() {
        let mut registry = VisionClientRegistry::empty();
        registry.register("broken", |_| Err(Error::Config("missing api_key".to_string())));
        assert!(matches!(
            registry.construct("broken", &ModuleSettings::default()),
            Err(Error::Config(msg)) if msg == "missing api_key"
        ));
    }
}

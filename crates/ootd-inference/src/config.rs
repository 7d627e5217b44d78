//! Vision module configuration.
//!
//! The configuration is an explicit snapshot loaded from YAML and passed to
//! the analysis pipeline at call time:
//!
//! ```yaml
//! selected_module:
//!   VLLM: ChatGLMVLLM
//! VLLM:
//!   ChatGLMVLLM:
//!     type: openai
//!     model_name: glm-4v-flash
//!     url: https://open.bigmodel.cn/api/paas/v4/
//!     api_key: ${GLM_API_KEY}
//! ```
//!
//! `${VAR}` references are substituted from the environment before parsing.
//! Keys other than `selected_module` and `VLLM` are ignored, so the file can be
//! shared with the rest of a larger deployment.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use ootd_core::defaults::VISION_MODULE_KEY;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl From<ConfigError> for ootd_core::Error {
    fn from(e: ConfigError) -> Self {
        ootd_core::Error::Config(e.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for a single vision module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Client type identifier (`openai`, `ollama`). Defaults to the module name.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub client_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// Service base URL.
    #[serde(default, alias = "base_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ModuleSettings {
    /// Non-empty API key, if any. Unresolved `${VAR}` placeholders count as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with("${"))
    }
}

/// Snapshot of the vision configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionSettings {
    /// Category to module name, e.g. `VLLM -> ChatGLMVLLM`.
    #[serde(default)]
    pub selected_module: HashMap<String, String>,

    /// Vision modules keyed by name.
    #[serde(rename = "VLLM", default)]
    pub modules: HashMap<String, ModuleSettings>,
}

/// A resolved vision module: its name, client type, and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionModule {
    pub name: String,
    pub client_type: String,
    pub settings: ModuleSettings,
}

impl VisionSettings {
    /// Load from a YAML file, returning empty settings when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Vision config not found, starting without a vision module");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Load from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml_str(&content)?;
        info!(
            path = %path.display(),
            modules = settings.modules.len(),
            selected = settings.selected_name().unwrap_or("<none>"),
            "Loaded vision config"
        );
        Ok(settings)
    }

    /// Parse YAML content after substituting `${VAR}` references.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let content = substitute_env_vars(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Build a snapshot holding one module, selected.
    pub fn single(name: impl Into<String>, settings: ModuleSettings) -> Self {
        let name = name.into();
        Self {
            selected_module: HashMap::from([(VISION_MODULE_KEY.to_string(), name.clone())]),
            modules: HashMap::from([(name, settings)]),
        }
    }

    /// Name of the selected vision module, if one is set.
    pub fn selected_name(&self) -> Option<&str> {
        self.selected_module
            .get(VISION_MODULE_KEY)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Resolve the active vision module from a settings snapshot.
///
/// The `type` field names the client type; when absent the module name is
/// used as the type.
pub fn resolve_vision_module(settings: &VisionSettings) -> ootd_core::Result<VisionModule> {
    let name = settings.selected_name().ok_or_else(|| {
        ootd_core::Error::Config("no default vision module has been selected".to_string())
    })?;

    let module = settings.modules.get(name).ok_or_else(|| {
        ootd_core::Error::Config(format!("settings for vision module '{}' are missing", name))
    })?;

    let client_type = module
        .client_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(name)
        .to_string();

    debug!(module = name, client_type = %client_type, "Resolved vision module");

    Ok(VisionModule {
        name: name.to_string(),
        client_type,
        settings: module.clone(),
    })
}

fn env_var_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Substitute environment variables in the format ${VAR_NAME}.
///
/// Unset variables are left in place.
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

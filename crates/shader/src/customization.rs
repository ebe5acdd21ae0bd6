use crate::template::Zone;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a customization file.
#[derive(Debug, thiserror::Error)]
pub enum CustomizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported customization format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

/// Caller-supplied source fragments for each [`Zone`].
///
/// `None` keeps the template default for that zone; `Some` (including
/// `Some("")`) replaces it. In files, a missing key or an explicit `null`
/// means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShaderCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_uniforms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_functions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_correction_function: Option<String>,
}

impl ShaderCustomization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_additional_uniforms(mut self, source: impl Into<String>) -> Self {
        self.additional_uniforms = Some(source.into());
        self
    }

    pub fn with_additional_functions(mut self, source: impl Into<String>) -> Self {
        self.additional_functions = Some(source.into());
        self
    }

    pub fn with_color_correction_function(mut self, source: impl Into<String>) -> Self {
        self.color_correction_function = Some(source.into());
        self
    }

    /// Content supplied for `zone`, if any.
    pub fn get(&self, zone: Zone) -> Option<&str> {
        match zone {
            Zone::AdditionalUniforms => self.additional_uniforms.as_deref(),
            Zone::AdditionalFunctions => self.additional_functions.as_deref(),
            Zone::ColorCorrection => self.color_correction_function.as_deref(),
        }
    }

    /// True when no zone is overridden.
    pub fn is_empty(&self) -> bool {
        Zone::ALL.iter().all(|zone| self.get(*zone).is_none())
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, CustomizationError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, CustomizationError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CustomizationError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let data = std::fs::read_to_string(path)?;
        let custom = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&data)?,
            "json" => Self::from_json_str(&data)?,
            _ => return Err(CustomizationError::UnsupportedFormat(path.display().to_string())),
        };
        tracing::debug!(
            path = %path.display(),
            zones = Zone::ALL.iter().filter(|z| custom.get(**z).is_some()).count(),
            "loaded shader customization"
        );
        Ok(custom)
    }
}

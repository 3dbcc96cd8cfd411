use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Model identifier stamped into generation info and `lastUsedModel`
pub const DEFAULT_MODEL_NAME: &str = "qwen2.5-vl-72b-instruct";

/// Sampling temperature written into the per-chat prediction config
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Per-run defaults passed into the normalizer.
///
/// The exported files need a model identifier and a temperature even though
/// the source archive knows neither, so the caller decides what gets stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefaults {
    pub model: String,
    pub temperature: f64,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ExportDefaults {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }

    /// Reject values LM Studio would choke on
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model name must not be empty".to_string()));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(Error::Config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MeterError;
use crate::kernel::mode::MeasurementMode;

/// Persisted plugin settings. The host owns storage and reload; the meter
/// only reads a snapshot of this at the start of each session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Raw mode value as stored on disk. See `MeasurementMode::from_raw`.
    #[serde(default)]
    pub mode: i32,
}

fn default_enabled() -> bool {
    true
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: MeasurementMode::Energy.as_raw(),
        }
    }
}

impl MeterConfig {
    pub fn with_mode(mode: MeasurementMode) -> Self {
        Self {
            mode: mode.as_raw(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> MeasurementMode {
        MeasurementMode::from_raw(self.mode)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MeterError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeterError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = MeterConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, MeterConfig::default());
        assert_eq!(cfg.mode(), MeasurementMode::Energy);
    }

    #[test]
    fn out_of_range_mode_is_kept() {
        let cfg = MeterConfig::from_json_str(r#"{"enabled": true, "mode": 12}"#).unwrap();
        assert_eq!(cfg.mode(), MeasurementMode::Unrecognized(12));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = MeterConfig::from_json_str("{mode:").unwrap_err();
        assert!(matches!(err, MeterError::Config(_)));
    }
}

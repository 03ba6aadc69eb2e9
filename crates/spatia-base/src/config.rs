use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Tunables for the gesture state machines and placement snapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// Lower clamp applied to each scale axis.
    pub min_scale: f32,
    /// Upper clamp applied to each scale axis.
    pub max_scale: f32,
    /// Clearance below which an object may be placed on a plane.
    pub snap_clearance: f32,
    /// Indicator scale when the object touches or penetrates the plane.
    pub indicator_max_scale: f32,
    /// Indicator scale at the clearance threshold.
    pub indicator_min_scale: f32,
    /// Emit a trace line for every notification.
    pub debug: bool,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            snap_clearance: 0.3,
            indicator_max_scale: 4.0,
            indicator_min_scale: 1.0,
            debug: false,
        }
    }
}

impl ManipulationConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_scale <= 0.0 {
            return Err(Error::InvalidConfig("min_scale must be > 0".to_string()));
        }
        if self.min_scale > self.max_scale {
            return Err(Error::InvalidConfig(
                "min_scale must not exceed max_scale".to_string(),
            ));
        }
        if self.snap_clearance <= 0.0 {
            return Err(Error::InvalidConfig(
                "snap_clearance must be > 0".to_string(),
            ));
        }
        if self.indicator_min_scale > self.indicator_max_scale {
            return Err(Error::InvalidConfig(
                "indicator_min_scale must not exceed indicator_max_scale".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() -> Result<()> {
        let config = ManipulationConfig::from_json_str(r#"{ "debug": true }"#)?;
        assert!(config.debug);
        assert_eq!(config.min_scale, 0.1);
        assert_eq!(config.max_scale, 5.0);
        assert_eq!(config.snap_clearance, 0.3);
        Ok(())
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let result = ManipulationConfig::from_json_str(r#"{ "min_scale": 2.0, "max_scale": 1.0 }"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = ManipulationConfig::from_json_str("{ min_scale: ");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host-supplied settings read by the editing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Number of strips a bridge is subdivided into along its length.
    pub bridge_segments: usize,
    /// Keep the current shading normals of vertices whose welds are cut.
    pub lock_normals_on_split: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            bridge_segments: 1,
            lock_normals_on_split: false,
        }
    }
}

impl EditConfig {
    /// Checks that every setting is in range.
    ///
    /// # Errors
    ///
    /// Returns an error if `bridge_segments` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge_segments == 0 {
            return Err(ConfigError::invalid_param(
                "bridge_segments",
                self.bridge_segments,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_flat_segment() {
        let config = EditConfig::default();
        assert_eq!(config.bridge_segments, 1);
        assert!(!config.lock_normals_on_split);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_segments_rejected() {
        let config = EditConfig {
            bridge_segments: 0,
            ..EditConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EditConfig = serde_json::from_str(r#"{ "bridge_segments": 3 }"#).unwrap();
        assert_eq!(config.bridge_segments, 3);
        assert!(!config.lock_normals_on_split);
    }
}

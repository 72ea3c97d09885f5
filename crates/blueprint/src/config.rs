//! Runtime configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::DataVersionGate;
use crate::error::ConfigError;
use crate::limits::MAX_DIMENSION;

/// Blueprint module configuration.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintConfig {
    /// Namespace of saved schematic ids.
    pub namespace: String,
    /// Largest outline side length the table accepts.
    pub max_side_length: u32,
    /// Blocks that form an outline.
    pub frame_blocks: Vec<String>,
    /// Blocks a capture leaves out.
    pub ignored_blocks: Vec<String>,
    /// Name used when the player gives none.
    pub default_name: String,
    /// zstd level for stored schematics; `None` stores raw bytes.
    pub compression_level: Option<i32>,
    /// Host data version stamped on captures. `None` leaves them unstamped
    /// and loads everything.
    pub data_version: Option<u32>,
    /// Oldest data version still loaded.
    pub min_data_version: u32,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            namespace: "blueprints".to_string(),
            max_side_length: 10,
            frame_blocks: vec!["scaffolding".to_string()],
            ignored_blocks: vec![
                "air".to_string(),
                "cave_air".to_string(),
                "void_air".to_string(),
                "structure_void".to_string(),
            ],
            default_name: "blueprint".to_string(),
            compression_level: Some(3),
            data_version: None,
            min_data_version: 0,
        }
    }
}

impl BlueprintConfig {
    /// Parses a JSON config and checks it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: BlueprintConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_side_length < 2 || self.max_side_length > MAX_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "max_side_length must be between 2 and {MAX_DIMENSION}, got {}",
                self.max_side_length
            )));
        }
        if self.frame_blocks.is_empty() {
            return Err(ConfigError::Invalid("frame_blocks is empty".to_string()));
        }
        if let Some(level) = self.compression_level {
            if !(1..=22).contains(&level) {
                return Err(ConfigError::Invalid(format!(
                    "compression_level must be between 1 and 22, got {level}"
                )));
            }
        }
        if let Some(current) = self.data_version {
            if self.min_data_version > current {
                return Err(ConfigError::Invalid(format!(
                    "min_data_version {} is newer than data_version {current}",
                    self.min_data_version
                )));
            }
        }
        Ok(())
    }

    /// Load gate for stored schematics, when a data version is configured.
    pub fn data_version_gate(&self) -> Option<DataVersionGate> {
        self.data_version
            .map(|current| DataVersionGate::new(current, self.min_data_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlueprintConfig::default();
        assert_eq!(config.namespace, "blueprints");
        assert_eq!(config.max_side_length, 10);
        assert_eq!(config.compression_level, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BlueprintConfig::from_json_str(r#"{ "max_side_length": 16 }"#).unwrap();
        assert_eq!(config.max_side_length, 16);
        assert_eq!(config.frame_blocks, vec!["scaffolding"]);
    }

    #[test]
    fn test_null_compression_stores_raw() {
        let config = BlueprintConfig::from_json_str(r#"{ "compression_level": null }"#).unwrap();
        assert_eq!(config.compression_level, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            BlueprintConfig::from_json_str(r#"{ "max_side_length": 1 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BlueprintConfig::from_json_str(r#"{ "frame_blocks": [] }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BlueprintConfig::from_json_str(r#"{ "compression_level": 40 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BlueprintConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_data_version_gate() {
        assert_eq!(BlueprintConfig::default().data_version_gate(), None);

        let config =
            BlueprintConfig::from_json_str(r#"{ "data_version": 4189, "min_data_version": 3700 }"#)
                .unwrap();
        assert_eq!(config.data_version_gate(), Some(DataVersionGate::new(4189, 3700)));

        assert!(matches!(
            BlueprintConfig::from_json_str(r#"{ "data_version": 10, "min_data_version": 20 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blueprints.json");
        std::fs::write(&path, r#"{ "namespace": "towns", "default_name": "house" }"#).unwrap();

        let config = BlueprintConfig::load(&path).unwrap();
        assert_eq!(config.namespace, "towns");
        assert_eq!(config.default_name, "house");

        assert!(matches!(
            BlueprintConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}

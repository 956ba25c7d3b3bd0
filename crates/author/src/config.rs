use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tilescape_common::ChunkCoord;
use tilescape_kernel::WorldConfig;
use tilescape_stream::ViewportConfig;

/// Errors from loading or saving a stage configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to bootstrap a stage.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "world": { "seed": "islands" }, "palette": { "lava": "#ff4500" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub world: WorldConfig,
    pub viewport: ViewportConfig,
    /// Chunk the window starts centered on.
    pub center: ChunkCoord,
    /// Extra `name -> #rrggbb` entries merged over the default palette.
    pub palette: BTreeMap<String, String>,
    /// Block type selected for placement at startup.
    pub selected: Option<String>,
}

impl StageConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the world and the window cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "world height must be positive, got {}",
                self.world.height
            )));
        }
        self.viewport
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = StageConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.world.seed, "seed");
        assert_eq!(config.world.height, 16);
        assert_eq!(config.viewport.margin_tiles, 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = StageConfig::from_json_str(
            r##"{
                "world": { "seed": "islands" },
                "viewport": { "zoom": 2.0 },
                "center": { "x": 3, "y": -1 },
                "palette": { "lava": "#ff4500" },
                "selected": "lava"
            }"##,
        )
        .unwrap();
        assert_eq!(config.world.seed, "islands");
        assert_eq!(config.world.dimension, "overworld");
        assert_eq!(config.viewport.zoom, 2.0);
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.center, ChunkCoord::new(3, -1));
        assert_eq!(config.palette["lava"], "#ff4500");
        assert_eq!(config.selected.as_deref(), Some("lava"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            StageConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn zero_height_is_invalid() {
        let err = StageConfig::from_json_str(r#"{"world":{"height":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("height")));
    }

    #[test]
    fn degenerate_zoom_is_invalid() {
        for json in [
            r#"{"viewport":{"zoom":0.0}}"#,
            r#"{"viewport":{"zoom":-1.5}}"#,
            r#"{"viewport":{"width":0.0}}"#,
        ] {
            assert!(
                matches!(StageConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} accepted"
            );
        }
        let mut config = StageConfig::default();
        assert!(config.validate().is_ok());
        config.viewport.zoom = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_file_is_rejected_on_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = StageConfig::default();
        config.world.height = -3;
        config.save(tmp.path()).unwrap();
        assert!(matches!(
            StageConfig::load(tmp.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = StageConfig::default();
        config.world.seed = "saved".into();
        config.palette.insert("moss".into(), "#2e8b57".into());
        config.save(tmp.path()).unwrap();

        let loaded = StageConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            StageConfig::load(dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }
}

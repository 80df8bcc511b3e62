//! Bridge configuration
//!
//! Read once at startup from `config.toml`. Every section is optional and
//! falls back to the built-in defaults; a missing file is not an error, a
//! malformed one is.

use crate::controller::controller_handle::ControllerSettings;
use crate::controller::repeat_engine::RepeatSettings;
use crate::controller::selector::STEAM_INPUT_SIGNATURE;
use crate::mapping::key_map::{ButtonBinding, KeyCodeMap, DEFAULT_AXIS_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "padbridge";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RepeatConfig {
    /// Delay before the first repeat, in ms
    pub delay_ms: u64,
    /// Time between repeats, in ms
    pub interval_ms: u64,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            interval_ms: 100,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub axis_threshold: f32,
    pub frame_interval_ms: u64,
    pub canonical_signature: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
            frame_interval_ms: 16,
            canonical_signature: STEAM_INPUT_SIGNATURE.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct OskConfig {
    /// Grants the on-screen keyboard its Exit key
    pub allow_exit: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub fullscreen: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub repeat: RepeatConfig,
    pub input: InputConfig,
    pub osk: OskConfig,
    pub window: WindowConfig,
    /// Per-button overrides of the default key map
    pub buttons: Vec<ButtonBinding>,
}

impl BridgeConfig {
    /// `<config dir>/padbridge/config.toml`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads the config at `path`, or the defaults if the file does not exist
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        if !exists {
            warn!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.input.axis_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "axis_threshold must be in (0, 1), got {}",
                threshold
            )));
        }
        if self.repeat.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "repeat interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn key_map(&self) -> KeyCodeMap {
        KeyCodeMap::with_bindings(&self.buttons)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            frame_interval_ms: self.input.frame_interval_ms,
            repeat: RepeatSettings {
                delay: Duration::from_millis(self.repeat.delay_ms),
                interval: Duration::from_millis(self.repeat.interval_ms),
                axis_threshold: self.input.axis_threshold,
                canonical_signature: self.input.canonical_signature.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::key_map::LogicalKey;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config = BridgeConfig::parse("").unwrap();
        assert_eq!(config, BridgeConfig::default());

        let settings = config.controller_settings();
        assert_eq!(settings.frame_interval_ms, 16);
        assert_eq!(settings.repeat.delay, Duration::from_millis(500));
        assert_eq!(settings.repeat.interval, Duration::from_millis(100));
    }

    #[test]
    fn test_partial_sections() {
        let config = BridgeConfig::parse(
            r#"
            [repeat]
            delay_ms = 300

            [osk]
            allow_exit = true

            [[buttons]]
            index = 0
            key = "Space"

            [[buttons]]
            index = 16
            key = "OpenOsk"
            "#,
        )
        .unwrap();

        assert_eq!(config.repeat.delay_ms, 300);
        assert_eq!(config.repeat.interval_ms, 100);
        assert!(config.osk.allow_exit);
        assert!(!config.window.fullscreen);

        let map = config.key_map();
        assert_eq!(map.button_key(0), LogicalKey::Space);
        assert_eq!(map.button_key(16), LogicalKey::OpenOsk);
        assert_eq!(map.button_key(1), LogicalKey::Escape);
    }

    #[test]
    fn test_invalid_threshold() {
        let result = BridgeConfig::parse("[input]\naxis_threshold = 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let result = BridgeConfig::parse("[[buttons]]\nindex = 0\nkey = \"Hyper\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load(&dir.path().join("config.toml"))
            .await
            .unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nfullscreen = true").unwrap();

        let config = BridgeConfig::load(file.path()).await.unwrap();
        assert!(config.window.fullscreen);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[repeat\ndelay_ms = ").unwrap();

        let result = BridgeConfig::load(file.path()).await;
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

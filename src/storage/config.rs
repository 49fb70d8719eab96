//! Assistant configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Clock and timezone settings
    pub clock: ClockSettings,
    /// Audio settings
    pub audio: AudioSettings,
    /// Snooze settings
    pub snooze: SnoozeSettings,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            clock: ClockSettings::default(),
            audio: AudioSettings::default(),
            snooze: SnoozeSettings::default(),
        }
    }
}

impl AssistantConfig {
    /// Directory the alarm sound files live in.
    pub fn sound_dir(&self) -> PathBuf {
        self.audio
            .sound_dir
            .clone()
            .unwrap_or_else(|| get_data_dir().join("sounds"))
    }
}

/// Clock and timezone settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSettings {
    /// IANA identifier of the home timezone
    pub home_timezone: String,
    /// API key for the time-by-coordinates fallback service
    pub time_api_key: Option<String>,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            home_timezone: "Asia/Ho_Chi_Minh".to_string(),
            time_api_key: None,
        }
    }
}

/// Audio settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Master alarm volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Starting volume for the gradual sound profile
    pub ramp_start_volume: f32,
    /// Volume added per ramp step
    pub ramp_step: f32,
    /// Seconds between ramp steps
    pub ramp_interval_secs: u64,
    /// Override for the sound file directory
    pub sound_dir: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            ramp_start_volume: 0.2,
            ramp_step: 0.1,
            ramp_interval_secs: 2,
            sound_dir: None,
        }
    }
}

/// Snooze settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnoozeSettings {
    /// Default snooze duration in minutes for new alarms
    pub default_minutes: u32,
    /// Maximum snooze count per alarm chain
    pub max_count: u32,
}

impl Default for SnoozeSettings {
    fn default() -> Self {
        Self {
            default_minutes: 5,
            max_count: 3,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "deskmate", "Deskmate")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the config file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from disk, falling back to defaults when absent.
pub fn load_config() -> Result<AssistantConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        tracing::info!("No config file found, using defaults");
        let mut config = AssistantConfig::default();
        config.data_dir = get_data_dir();
        return Ok(config);
    }

    let content =
        std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

    let mut config: AssistantConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save configuration to disk.
pub fn save_config(config: &AssistantConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

    Ok(())
}

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::{BackendPreference, PlaybackConfig};
use crate::error::ConfigError;
use crate::services::StoreLatency;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory relative sound URLs resolve against
    pub sounds_dir: String,

    /// Volume applied at startup (0.0-1.0)
    pub default_volume: f32,

    /// Playback backend preference
    pub backend: BackendPreference,

    /// Load attempts before a sound is written off
    pub preload_attempts: u32,

    /// Bound on the per-attempt "ready to play" wait
    pub ready_timeout_secs: u64,

    /// Base delay for exponential backoff between load attempts
    pub retry_backoff_ms: u64,

    /// Artificial data-store latency for reads
    pub store_read_latency_ms: u64,

    /// Artificial data-store latency for writes
    pub store_write_latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sounds_dir: "sounds".to_string(),
            default_volume: 1.0,
            backend: BackendPreference::Auto,
            preload_attempts: 3,
            ready_timeout_secs: 10,
            retry_backoff_ms: 500,
            store_read_latency_ms: 200,
            store_write_latency_ms: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                source: Box::new(e),
            })?;
            let config: AppConfig =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: config_path.display().to_string(),
                    source: Box::new(e),
                })?;

            tracing::info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save()?;
            tracing::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: config_path.display().to_string(),
            source: Box::new(e),
        })?;
        fs::write(&config_path, json).map_err(|e| ConfigError::SaveFailed {
            path: config_path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("PhonicsPlay").join("config.json"))
    }

    /// Get the config file path (for display purposes)
    pub fn config_path_display() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// The audio-facing slice of this configuration.
    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            backend: self.backend,
            max_attempts: self.preload_attempts,
            ready_timeout: Duration::from_secs(self.ready_timeout_secs),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            sounds_dir: PathBuf::from(&self.sounds_dir),
        }
    }

    /// The store-facing slice of this configuration.
    pub fn store_latency(&self) -> StoreLatency {
        StoreLatency::new(self.store_read_latency_ms, self.store_write_latency_ms)
    }
}

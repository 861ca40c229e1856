//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::KeepcutError;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default export settings.
    pub export: ExportDefaults,

    /// Interactive timeline tuning.
    pub timeline: TimelineDefaults,

    /// Transcript-driven cut detection.
    pub analysis: AnalysisDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Container format (`mp4` or `gif`).
    pub format: String,

    /// Target resolution (`480p`, `720p`, `1080p`).
    pub resolution: String,

    /// Target frame rate.
    pub fps: u32,

    /// x264 constant rate factor for MP4 output.
    pub mp4_crf: u32,

    /// `palettegen` stats mode for GIF output (`full` or `diff`).
    pub gif_stats_mode: String,
}

/// Timeline interaction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    /// Distance in pixels within which a pointer-down grabs a trim handle.
    pub handle_tolerance_px: f64,

    /// Smallest allowed gap between trim start and trim end, in seconds.
    pub min_trim_gap_secs: f64,
}

/// Silence detection parameters used when an analyzer only provides words.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    /// Minimum gap between words considered a removable silence.
    pub min_silence_secs: f64,

    /// Padding kept on both sides of a detected silence.
    pub silence_padding_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "keepcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            format: "mp4".to_string(),
            resolution: "720p".to_string(),
            fps: 30,
            mp4_crf: 23,
            gif_stats_mode: "diff".to_string(),
        }
    }
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            handle_tolerance_px: 8.0,
            min_trim_gap_secs: 0.1,
        }
    }
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            min_silence_secs: 1.0,
            silence_padding_secs: 0.15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        let (config, problem) = Self::load_checked_from(config_path);
        if let Some(e) = problem {
            tracing::warn!(error = %e, "Using default configuration");
        }
        config
    }

    /// Like [`AppConfig::load`], but hands back the load failure instead of
    /// logging it, for callers that set up logging from the config.
    pub fn load_checked() -> (Self, Option<KeepcutError>) {
        Self::load_checked_from(&config_file_path())
    }

    /// Load from `config_path`. A missing file yields defaults and no error;
    /// an unreadable or invalid file yields defaults and the error.
    pub fn load_checked_from(config_path: &std::path::Path) -> (Self, Option<KeepcutError>) {
        if !config_path.exists() {
            return (Self::default(), None);
        }
        let parsed = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config at {}: {e}", config_path.display()))
            .and_then(|content| {
                serde_json::from_str(&content).map_err(|e| {
                    format!("Failed to parse config at {}: {e}", config_path.display())
                })
            });
        match parsed {
            Ok(config) => (config, None),
            Err(message) => (Self::default(), Some(KeepcutError::config(message))),
        }
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("keepcut").join("config.json")
}

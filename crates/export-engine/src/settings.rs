//! Export settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use keepcut_common::config::ExportDefaults;
use keepcut_common::error::{KeepcutError, KeepcutResult};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    Gif,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "video/mp4",
            ExportFormat::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::Gif => "gif",
        }
    }

    /// GIF carries no audio stream.
    pub fn supports_audio(self) -> bool {
        matches!(self, ExportFormat::Mp4)
    }
}

impl FromStr for ExportFormat {
    type Err = KeepcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(ExportFormat::Mp4),
            "gif" => Ok(ExportFormat::Gif),
            other => Err(KeepcutError::config(format!(
                "Unknown format: {other}. Use: mp4, gif"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Target output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    /// Letterbox canvas for MP4 output.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::P480 => (854, 480),
            Resolution::P720 => (1280, 720),
            Resolution::P1080 => (1920, 1080),
        }
    }

    /// GIF output width; height follows the source aspect ratio.
    pub fn gif_width(self) -> u32 {
        match self {
            Resolution::P480 => 480,
            Resolution::P720 => 640,
            Resolution::P1080 => 800,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::P480 => "480p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        }
    }
}

impl FromStr for Resolution {
    type Err = KeepcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "480p" | "480" => Ok(Resolution::P480),
            "720p" | "720" => Ok(Resolution::P720),
            "1080p" | "1080" => Ok(Resolution::P1080),
            other => Err(KeepcutError::config(format!(
                "Unknown resolution: {other}. Use: 480p, 720p, 1080p"
            ))),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target output frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    Fps15,
    Fps24,
    Fps30,
    Fps60,
}

impl FrameRate {
    pub fn fps(self) -> u32 {
        match self {
            FrameRate::Fps15 => 15,
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = KeepcutError;

    fn try_from(fps: u32) -> Result<Self, Self::Error> {
        match fps {
            15 => Ok(FrameRate::Fps15),
            24 => Ok(FrameRate::Fps24),
            30 => Ok(FrameRate::Fps30),
            60 => Ok(FrameRate::Fps60),
            other => Err(KeepcutError::config(format!(
                "Unsupported frame rate: {other}. Use: 15, 24, 30, 60"
            ))),
        }
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> Self {
        rate.fps()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}fps", self.fps())
    }
}

/// What the user picked for this export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    /// x264 constant rate factor (lower is better quality).
    #[serde(default = "default_crf")]
    pub mp4_crf: u32,
    /// `palettegen` statistics mode for GIF output.
    #[serde(default)]
    pub gif_stats_mode: PaletteStatsMode,
}

/// `palettegen` statistics mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteStatsMode {
    /// Palette from every pixel of every frame.
    Full,
    /// Palette weighted towards moving regions.
    #[default]
    Diff,
}

impl PaletteStatsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PaletteStatsMode::Full => "full",
            PaletteStatsMode::Diff => "diff",
        }
    }
}

impl FromStr for PaletteStatsMode {
    type Err = KeepcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(PaletteStatsMode::Full),
            "diff" => Ok(PaletteStatsMode::Diff),
            other => Err(KeepcutError::config(format!(
                "Unknown GIF stats mode: {other}. Use: full, diff"
            ))),
        }
    }
}

fn default_crf() -> u32 {
    23
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Mp4,
            resolution: Resolution::P720,
            frame_rate: FrameRate::Fps30,
            mp4_crf: default_crf(),
            gif_stats_mode: PaletteStatsMode::Diff,
        }
    }
}

impl ExportSettings {
    /// Build settings from the configured defaults.
    pub fn from_defaults(defaults: &ExportDefaults) -> KeepcutResult<Self> {
        Ok(Self {
            format: defaults.format.parse()?,
            resolution: defaults.resolution.parse()?,
            frame_rate: FrameRate::try_from(defaults.fps)?,
            mp4_crf: defaults.mp4_crf.min(51),
            gif_stats_mode: defaults.gif_stats_mode.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_values() {
        assert_eq!("MP4".parse::<ExportFormat>().unwrap(), ExportFormat::Mp4);
        assert_eq!("720".parse::<Resolution>().unwrap(), Resolution::P720);
        assert_eq!(FrameRate::try_from(24).unwrap(), FrameRate::Fps24);
        assert!("webm".parse::<ExportFormat>().is_err());
        assert!(FrameRate::try_from(25).is_err());
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Mp4.mime_type(), "video/mp4");
        assert_eq!(ExportFormat::Gif.mime_type(), "image/gif");
    }

    #[test]
    fn test_from_defaults() {
        let settings = ExportSettings::from_defaults(&ExportDefaults::default()).unwrap();
        assert_eq!(settings, ExportSettings::default());

        let bad = ExportDefaults {
            fps: 7,
            ..ExportDefaults::default()
        };
        assert!(ExportSettings::from_defaults(&bad).is_err());
    }

    #[test]
    fn test_settings_serde_shape() {
        let json = serde_json::to_value(ExportSettings::default()).unwrap();
        assert_eq!(json["format"], "mp4");
        assert_eq!(json["resolution"], "720p");
        assert_eq!(json["frame_rate"], 30);
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::range::Grouping;
use crate::dsp::pitch::PitchConfig;
use crate::paths;

/// Application configuration, loaded from <config_dir>/ambitus/config.toml.
///
/// Every section is `#[serde(default)]`, so a partial file (or no file at
/// all) fills the gaps from the Default implementations below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recording: RecordingConfig,
    pub detection: DetectionConfig,
    pub tones: ToneConfig,
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Input device name, or "default" for the system default.
    pub device: String,
    /// Seconds of silence after which a take stops on its own (0 = never).
    pub auto_stop_silence_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detector window in samples (at least 1024).
    pub frame_size: usize,
    /// Advance between windows in samples.
    pub hop_size: usize,
    pub pitch_floor_hz: f32,
    pub pitch_ceiling_hz: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Length of each reference note.
    pub note_duration_ms: u32,
    /// Silence between notes of a pattern.
    pub gap_ms: u32,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Grouping used when `--grouping` is not given.
    pub grouping: Grouping,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            device: "default".into(),
            auto_stop_silence_secs: 0.0,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let pitch = PitchConfig::default();
        Self {
            frame_size: pitch.frame_size,
            hop_size: pitch.hop_size,
            pitch_floor_hz: pitch.pitch_floor_hz,
            pitch_ceiling_hz: pitch.pitch_ceiling_hz,
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            note_duration_ms: 1500,
            gap_ms: 250,
            sample_rate: 44100,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            // Considers every range until the user says otherwise.
            grouping: Grouping::PreferNotToSay,
        }
    }
}

/// Bridge from the user-facing config to the detector's parameters.
impl From<&DetectionConfig> for PitchConfig {
    fn from(cfg: &DetectionConfig) -> Self {
        PitchConfig {
            frame_size: cfg.frame_size,
            hop_size: cfg.hop_size,
            pitch_floor_hz: cfg.pitch_floor_hz,
            pitch_ceiling_hz: cfg.pitch_ceiling_hz,
        }
    }
}

/// Load the application config. A missing file means defaults.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&paths::config_file())
}

pub fn load_config_from(path: &std::path::Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.detection.frame_size, 2048);
        assert_eq!(cfg.tones.note_duration_ms, 1500);
        assert_eq!(cfg.profile.grouping, Grouping::PreferNotToSay);
        assert_eq!(cfg.recording.device, "default");
    }

    #[test]
    fn parse_partial_toml() {
        // Only some fields given; the rest fall back to defaults
        let toml_str = r#"
[detection]
pitch_floor_hz = 70.0

[profile]
grouping = "prefer-not-to-say"
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.detection.pitch_floor_hz, 70.0);
        assert_eq!(cfg.detection.pitch_ceiling_hz, 1500.0);
        assert_eq!(cfg.tones.gap_ms, 250);
        assert_eq!(cfg.profile.grouping, Grouping::PreferNotToSay);
    }

    #[test]
    fn grouping_from_toml() {
        let cfg: AppConfig = toml::from_str("[profile]\ngrouping = \"man\"\n").unwrap();
        assert_eq!(cfg.profile.grouping, Grouping::Man);
    }

    #[test]
    fn pitch_config_conversion() {
        let cfg = DetectionConfig {
            hop_size: 512,
            ..DetectionConfig::default()
        };
        let pitch_cfg: PitchConfig = (&cfg).into();
        assert_eq!(pitch_cfg.hop_size, 512);
        assert_eq!(pitch_cfg.frame_size, 2048);
    }

    #[test]
    fn roundtrip_toml() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let loaded: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.detection.hop_size, cfg.detection.hop_size);
        assert_eq!(loaded.profile.grouping, cfg.profile.grouping);
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(cfg.tones.sample_rate, 44100);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[detection]\nframe_size = \"big\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}

//! Experience settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{AMBIENT_PARTICLES, CANVAS_HEIGHT};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ambient particle pool size for this preset
    pub fn ambient_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => AMBIENT_PARTICLES,
            QualityPreset::High => 120,
        }
    }

    /// Whether ambient particles twinkle in the second half of the story
    pub fn twinkle_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Sparkles drawn inside an active zone
    pub fn zone_sparkles(&self) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => 5,
            QualityPreset::High => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visuals ===
    /// Glowing trail behind the line
    pub trails: bool,
    /// Score, progress bar and level label
    pub show_hud: bool,
    /// Canvas height in CSS pixels
    pub canvas_height: f64,
    /// Minimize twinkle and glow animation
    pub reduced_motion: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,

    /// Fixed RNG seed (random per visit when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            show_hud: true,
            canvas_height: CANVAS_HEIGHT,
            reduced_motion: false,
            master_volume: 0.8,
            muted: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.canvas_height > 0.0 && self.canvas_height.is_finite()) {
            return Err(SettingsError::OutOfRange {
                field: "canvas_height",
                value: self.canvas_height,
            });
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(SettingsError::OutOfRange {
                field: "master_volume",
                value: self.master_volume as f64,
            });
        }
        Ok(())
    }

    /// Effective twinkle (respects reduced_motion)
    pub fn effective_twinkle(&self) -> bool {
        self.quality.twinkle_enabled() && !self.reduced_motion
    }

    /// Effective volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "lignes_de_vie_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("Settings key {} unused on native", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_preset_particle_counts() {
        assert_eq!(QualityPreset::Low.ambient_particles(), 20);
        assert_eq!(QualityPreset::Medium.ambient_particles(), 50);
        assert_eq!(QualityPreset::High.ambient_particles(), 120);
        assert_eq!(QualityPreset::Low.zone_sparkles(), 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"quality": "High", "seed": 7}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.seed, Some(7));
        assert!(settings.trails);
        assert_eq!(settings.canvas_height, 600.0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = Settings::from_json(r#"{"master_volume": 3.0}"#).unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { field: "master_volume", .. }));
        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_effective_flags() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        assert!(settings.effective_twinkle());
        settings.reduced_motion = true;
        assert!(!settings.effective_twinkle());
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_roundtrip_through_json() {
        let settings = Settings {
            seed: Some(99),
            ..Settings::from_preset(QualityPreset::Low)
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}

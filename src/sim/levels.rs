//! Level table
//!
//! Five narrative levels laid end to end along the world x axis. Each level
//! carries its own physics profile (how the line moves) and visual profile
//! (how the photographs are filtered). The table is immutable once built.

use serde::{Deserialize, Serialize};

use super::manifest::ManifestError;
use super::physics;

/// 8-bit RGB color parsed from `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, a)` with alpha clamped to [0, 1]
    pub fn to_css_alpha(self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

/// How the line moves inside a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelPhysics {
    /// Per-frame velocity multiplier, in (0, 1)
    pub friction: f64,
    pub gravity: f64,
    pub turbulence: f64,
    pub max_speed: f64,
    /// Pull toward the centerline, in [0, 1]
    pub stability_factor: f64,
    #[serde(default)]
    pub force_fields: bool,
    #[serde(default)]
    pub invert_gravity: bool,
}

impl LevelPhysics {
    /// Check the ranges the physics pipeline relies on
    pub fn validate(&self) -> Result<(), String> {
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(format!("friction {} outside (0, 1)", self.friction));
        }
        if self.gravity < 0.0 || !self.gravity.is_finite() {
            return Err(format!("gravity {} must be >= 0", self.gravity));
        }
        if self.turbulence < 0.0 || !self.turbulence.is_finite() {
            return Err(format!("turbulence {} must be >= 0", self.turbulence));
        }
        if !(self.max_speed > 0.0 && self.max_speed.is_finite()) {
            return Err(format!("maxSpeed {} must be > 0", self.max_speed));
        }
        if !(0.0..=1.0).contains(&self.stability_factor) {
            return Err(format!(
                "stabilityFactor {} outside [0, 1]",
                self.stability_factor
            ));
        }
        Ok(())
    }

    /// Run one frame of the velocity pipeline under this profile
    #[allow(clippy::too_many_arguments)]
    pub fn integrate<R: rand::Rng + ?Sized>(
        &self,
        pos: glam::DVec2,
        v: glam::DVec2,
        center_y: f64,
        bounds: (f64, f64, f64),
        zones: &[super::state::InteractiveZone],
        field: &physics::FieldContext<'_>,
        rng: &mut R,
    ) -> glam::DVec2 {
        physics::integrate(pos, v, self, center_y, bounds, zones, field, rng)
    }
}

/// How photographs look inside a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelVisual {
    pub grain: f64,
    pub blur: f64,
    pub contrast: f64,
    pub saturation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vignette: Option<f64>,
    #[serde(default)]
    pub drift: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub color: Rgb,
    pub title: String,
    pub subtitle: String,
    pub physics: LevelPhysics,
    pub visual: LevelVisual,
    pub width: f64,
}

/// Ordered, immutable list of levels with cached total width
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: Vec<Level>,
    /// `starts[i]` is the cumulative width of levels `0..i`
    starts: Vec<f64>,
    total_width: f64,
}

impl LevelTable {
    /// Build from a list of levels, validating each one
    pub fn new(levels: Vec<Level>) -> Result<Self, ManifestError> {
        if levels.is_empty() {
            return Err(ManifestError::Empty("levels"));
        }

        for level in &levels {
            if !(level.width > 0.0 && level.width.is_finite()) {
                return Err(ManifestError::Invalid {
                    id: level.id.clone(),
                    reason: format!("width {} must be > 0", level.width),
                });
            }
            level.physics.validate().map_err(|reason| ManifestError::Invalid {
                id: level.id.clone(),
                reason,
            })?;
        }

        Ok(Self::laid_out(levels))
    }

    /// Lay validated levels end to end
    fn laid_out(levels: Vec<Level>) -> Self {
        let mut starts = Vec::with_capacity(levels.len());
        let mut total = 0.0;
        for level in &levels {
            starts.push(total);
            total += level.width;
        }
        Self {
            levels,
            starts,
            total_width: total,
        }
    }

    /// Parse a JSON array of levels (camelCase fields)
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Sum of all level widths
    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    /// World x where level `index` begins
    pub fn level_start(&self, index: usize) -> f64 {
        self.starts.get(index).copied().unwrap_or(self.total_width)
    }

    /// Index of the level containing `position`. Negative positions map to
    /// the first level, positions at or past the end to the last.
    pub fn current_index(&self, position: f64) -> usize {
        // First level whose end is strictly past `position`
        let last = self.levels.len() - 1;
        for (i, level) in self.levels.iter().enumerate() {
            if position < self.starts[i] + level.width {
                return i;
            }
        }
        last
    }

    pub fn current_level(&self, position: f64) -> &Level {
        &self.levels[self.current_index(position)]
    }

    /// Fraction of the whole world covered, in [0, 1]
    pub fn global_progress(&self, position: f64) -> f64 {
        if self.total_width <= 0.0 {
            return 0.0;
        }
        (position / self.total_width).clamp(0.0, 1.0)
    }

    /// Fraction of the current level covered, in [0, 1]
    pub fn level_progress(&self, position: f64) -> f64 {
        let index = self.current_index(position);
        let level = &self.levels[index];
        ((position - self.starts[index]) / level.width).clamp(0.0, 1.0)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::laid_out(default_levels())
    }
}

#[allow(clippy::too_many_arguments)]
fn level(
    id: &str,
    name: &str,
    color: Rgb,
    title: &str,
    subtitle: &str,
    physics: LevelPhysics,
    visual: LevelVisual,
    width: f64,
) -> Level {
    Level {
        id: id.into(),
        name: name.into(),
        color,
        title: title.into(),
        subtitle: subtitle.into(),
        physics,
        visual,
        width,
    }
}

/// The five levels of the story, 10 500 world units in total
pub fn default_levels() -> Vec<Level> {
    vec![
        level(
            "chaos",
            "CHAOS",
            Rgb::new(0xe8, 0xe8, 0xf0),
            "Naître dans le bruit.",
            "Tamil Eelam, 2004-2009",
            LevelPhysics {
                friction: 0.92,
                gravity: 0.3,
                turbulence: 0.8,
                max_speed: 4.0,
                stability_factor: 0.3,
                force_fields: false,
                invert_gravity: false,
            },
            LevelVisual {
                grain: 0.8,
                blur: 4.0,
                contrast: 0.6,
                saturation: 0.4,
                vignette: None,
                drift: false,
                brightness: None,
            },
            2000.0,
        ),
        level(
            "constraint",
            "CONTRAINTE",
            Rgb::WHITE,
            "Tenir dans le noir.",
            "3 ans",
            LevelPhysics {
                friction: 0.85,
                gravity: 0.15,
                turbulence: 0.5,
                max_speed: 3.0,
                stability_factor: 0.4,
                force_fields: true,
                invert_gravity: false,
            },
            LevelVisual {
                grain: 0.6,
                blur: 2.0,
                contrast: 0.7,
                saturation: 0.3,
                vignette: Some(0.8),
                drift: false,
                brightness: None,
            },
            1800.0,
        ),
        level(
            "displacement",
            "DÉPLACEMENT",
            Rgb::WHITE,
            "Trouver une sortie.",
            "Inde → France, 2014",
            LevelPhysics {
                friction: 0.88,
                gravity: 0.2,
                turbulence: 0.6,
                max_speed: 5.0,
                stability_factor: 0.5,
                force_fields: false,
                invert_gravity: true,
            },
            LevelVisual {
                grain: 0.5,
                blur: 1.0,
                contrast: 0.8,
                saturation: 0.5,
                vignette: None,
                drift: true,
                brightness: None,
            },
            2200.0,
        ),
        level(
            "reconstruction",
            "RECONSTRUCTION",
            Rgb::WHITE,
            "Recommencer. Respirer.",
            "France, apprentissage",
            LevelPhysics {
                friction: 0.94,
                gravity: 0.05,
                turbulence: 0.3,
                max_speed: 6.0,
                stability_factor: 0.7,
                force_fields: false,
                invert_gravity: false,
            },
            LevelVisual {
                grain: 0.3,
                blur: 0.5,
                contrast: 0.9,
                saturation: 0.7,
                vignette: None,
                drift: false,
                brightness: None,
            },
            2000.0,
        ),
        level(
            "light",
            "LUMIÈRE",
            Rgb::new(0xf4, 0xc5, 0x42),
            "Courir vers la lumière.",
            "Football professionnel",
            LevelPhysics {
                friction: 0.96,
                gravity: 0.0,
                turbulence: 0.1,
                max_speed: 8.0,
                stability_factor: 0.9,
                force_fields: false,
                invert_gravity: false,
            },
            LevelVisual {
                grain: 0.1,
                blur: 0.0,
                contrast: 1.0,
                saturation: 1.0,
                vignette: None,
                drift: false,
                brightness: Some(1.2),
            },
            2500.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_total_width() {
        let table = LevelTable::default();
        assert_eq!(table.len(), 5);
        assert_eq!(table.total_width(), 10_500.0);
    }

    #[test]
    fn test_defaults_pass_validation() {
        let table = LevelTable::new(default_levels()).unwrap();
        assert_eq!(table.total_width(), LevelTable::default().total_width());
    }

    #[test]
    fn test_level_scenarios() {
        let table = LevelTable::default();
        assert_eq!(table.current_level(2500.0).id, "constraint");
        assert_eq!(table.current_level(15_000.0).id, "light");
        assert_eq!(table.current_level(-50.0).id, "chaos");
    }

    #[test]
    fn test_level_boundaries() {
        let table = LevelTable::default();
        assert_eq!(table.current_level(1999.999).id, "chaos");
        assert_eq!(table.current_level(2000.0).id, "constraint");
        assert_eq!(table.current_level(3800.0).id, "displacement");
        assert_eq!(table.current_level(10_499.0).id, "light");
        assert_eq!(table.current_level(10_500.0).id, "light");
    }

    fn plain(id: &str, width: f64) -> Level {
        Level {
            id: id.into(),
            width,
            ..default_levels().remove(0)
        }
    }

    #[test]
    fn test_two_level_boundaries() {
        let table = LevelTable::new(vec![plain("a", 100.0), plain("b", 50.0)]).unwrap();
        assert_eq!(table.total_width(), 150.0);
        assert_eq!(table.current_level(99.0).id, "a");
        assert_eq!(table.current_level(100.0).id, "b");
        assert_eq!(table.current_level(151.0).id, "b");
        assert_eq!(table.level_start(1), 100.0);
    }

    #[test]
    fn test_level_progress() {
        let table = LevelTable::new(vec![plain("a", 100.0), plain("b", 50.0)]).unwrap();
        assert_eq!(table.level_progress(-5.0), 0.0);
        assert_eq!(table.level_progress(50.0), 0.5);
        assert_eq!(table.level_progress(125.0), 0.5);
        assert_eq!(table.level_progress(400.0), 1.0);
    }

    #[test]
    fn test_global_progress_clamped() {
        let table = LevelTable::default();
        assert_eq!(table.global_progress(-10.0), 0.0);
        assert_eq!(table.global_progress(5250.0), 0.5);
        assert_eq!(table.global_progress(20_000.0), 1.0);
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r##"[{
            "id": "only",
            "name": "ONLY",
            "color": "#f4c542",
            "title": "t",
            "subtitle": "s",
            "physics": {"friction": 0.9, "gravity": 0.1, "turbulence": 0.2,
                        "maxSpeed": 3, "stabilityFactor": 0.5, "invertGravity": true},
            "visual": {"grain": 0.1, "blur": 0, "contrast": 1, "saturation": 1},
            "width": 1000
        }]"##;
        let table = LevelTable::from_json(json).unwrap();
        let level = table.current_level(0.0);
        assert_eq!(level.color, Rgb::new(0xf4, 0xc5, 0x42));
        assert!(level.physics.invert_gravity);
        assert!(!level.physics.force_fields);
        assert_eq!(table.total_width(), 1000.0);
    }

    #[test]
    fn test_from_json_rejects_bad_physics() {
        let json = r##"[{
            "id": "bad", "name": "B", "color": "#ffffff", "title": "", "subtitle": "",
            "physics": {"friction": 1.5, "gravity": 0, "turbulence": 0,
                        "maxSpeed": 3, "stabilityFactor": 0.5},
            "visual": {"grain": 0, "blur": 0, "contrast": 1, "saturation": 1},
            "width": 100
        }]"##;
        assert!(matches!(
            LevelTable::from_json(json),
            Err(ManifestError::Invalid { .. })
        ));
        assert!(matches!(LevelTable::from_json("[]"), Err(ManifestError::Empty(_))));
    }

    #[test]
    fn test_rgb_parsing() {
        assert_eq!(Rgb::from_hex("#e8e8f0"), Some(Rgb::new(0xe8, 0xe8, 0xf0)));
        assert_eq!(Rgb::from_hex("ffffff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
        assert_eq!(Rgb::WHITE.to_css_alpha(2.0), "rgba(255, 255, 255, 1)");
    }

    proptest! {
        #[test]
        fn prop_current_level_total(position in -1.0e6f64..1.0e6) {
            let table = LevelTable::default();
            let index = table.current_index(position);
            prop_assert!(index < table.len());
            if position >= table.total_width() {
                prop_assert_eq!(index, table.len() - 1);
            } else if position >= 0.0 {
                let start = table.level_start(index);
                prop_assert!(start <= position);
                prop_assert!(position < start + table.levels()[index].width);
            }
        }
    }
}

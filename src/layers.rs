//! Layered photo presentation
//!
//! Large per-level photographs drawn behind the polaroids. Each one either
//! fades in as the line gets close (reveal), slides against the scroll
//! (parallax) or just sits there (static). All of them are filtered with
//! the owning level's visual profile.

use crate::sim::levels::{LevelTable, LevelVisual};

/// Horizontal parallax factor applied on top of a photo's depth
pub const PARALLAX_FACTOR: f64 = -0.3;
/// Revealed photos fade out once the line is this many thresholds away
pub const REVEAL_HIDE_FACTOR: f64 = 1.5;
/// Sway of photos on drifting levels, in pixels
pub const DRIFT_AMPLITUDE: f64 = 12.0;
const DRIFT_RATE: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhotoMode {
    /// Opacity follows proximity, latched once seen
    Reveal { threshold: f64 },
    /// Offset proportional to scroll
    Parallax { depth: f64 },
    Static,
}

/// One photograph on a level layer (coordinates in world units)
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPhoto {
    pub src: String,
    pub level_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub mode: PhotoMode,
    revealed: bool,
    opacity: f64,
    offset_x: f64,
}

impl LayerPhoto {
    pub fn new(
        src: impl Into<String>,
        level_id: impl Into<String>,
        x: f64,
        y: f64,
        size: (f64, f64),
        mode: PhotoMode,
    ) -> Self {
        let opacity = match mode {
            PhotoMode::Reveal { .. } => 0.0,
            _ => 1.0,
        };
        Self {
            src: src.into(),
            level_id: level_id.into(),
            x,
            y,
            width: size.0,
            height: size.1,
            mode,
            revealed: false,
            opacity,
            offset_x: 0.0,
        }
    }

    /// Recompute opacity and offset for the current frame
    pub fn update(&mut self, player_x: f64, scroll_position: f64) {
        match self.mode {
            PhotoMode::Reveal { threshold } => {
                let distance = (player_x - self.x).abs();
                if distance < threshold {
                    self.revealed = true;
                    self.opacity = (1.0 - distance / threshold).clamp(0.0, 1.0);
                } else if self.revealed && distance > threshold * REVEAL_HIDE_FACTOR {
                    self.opacity = 0.0;
                }
            }
            PhotoMode::Parallax { depth } => {
                self.offset_x = scroll_position * depth * PARALLAX_FACTOR;
            }
            PhotoMode::Static => {}
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Canvas/CSS filter derived from a level's visual profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualFilter {
    pub grayscale: f64,
    /// Pixels
    pub blur: f64,
    pub contrast: f64,
    pub saturate: f64,
    pub brightness: f64,
    /// Edge darkening drawn over the photo, 0 for none
    pub vignette: f64,
    pub drift: bool,
}

impl From<&LevelVisual> for VisualFilter {
    fn from(visual: &LevelVisual) -> Self {
        Self {
            grayscale: visual.grain,
            blur: visual.blur,
            contrast: visual.contrast,
            saturate: visual.saturation,
            brightness: visual.brightness.unwrap_or(1.0),
            vignette: visual.vignette.unwrap_or(0.0).clamp(0.0, 1.0),
            drift: visual.drift,
        }
    }
}

impl VisualFilter {
    /// Filter string understood by both CSS and `CanvasRenderingContext2D.filter`
    pub fn to_filter_string(&self) -> String {
        format!(
            "grayscale({}) blur({}px) contrast({}) saturate({}) brightness({})",
            self.grayscale, self.blur, self.contrast, self.saturate, self.brightness
        )
    }

    /// Offset of a drifting photo at `now_ms`; zero on still levels
    pub fn drift_offset(&self, now_ms: f64) -> (f64, f64) {
        if !self.drift {
            return (0.0, 0.0);
        }
        let t = now_ms * DRIFT_RATE;
        (t.sin() * DRIFT_AMPLITUDE, (t * 0.7).cos() * DRIFT_AMPLITUDE * 0.5)
    }
}

/// All layered photographs of the world
#[derive(Debug, Clone, Default)]
pub struct PhotoLayer {
    photos: Vec<LayerPhoto>,
}

impl PhotoLayer {
    pub fn new(photos: Vec<LayerPhoto>) -> Self {
        Self { photos }
    }

    /// The shipped per-level photographs, positioned from each level's start
    pub fn for_levels(levels: &LevelTable) -> Self {
        let reveal = |threshold| PhotoMode::Reveal { threshold };
        let parallax = |depth| PhotoMode::Parallax { depth };
        // (level, src, offset from level start, y, w, h, mode)
        let table: [(&str, &str, f64, f64, f64, f64, PhotoMode); 11] = [
            ("chaos", "/images/oli1.jpg", 300.0, 100.0, 500.0, 400.0, reveal(450.0)),
            ("chaos", "/images/oli2.jpg", 900.0, 250.0, 450.0, 350.0, parallax(0.6)),
            ("chaos", "/images/oli3.jpg", 1400.0, 50.0, 400.0, 300.0, reveal(400.0)),
            ("constraint", "/images/oli4.jpg", 400.0, 150.0, 350.0, 400.0, reveal(350.0)),
            ("constraint", "/images/oli5.jpg", 1000.0, 200.0, 400.0, 350.0, parallax(0.4)),
            ("displacement", "/images/oli6.jpg", 500.0, 100.0, 600.0, 400.0, parallax(0.7)),
            ("displacement", "/images/oli7.jpg", 1300.0, 250.0, 450.0, 300.0, reveal(500.0)),
            ("reconstruction", "/images/oli8.jpg", 400.0, 120.0, 500.0, 380.0, reveal(400.0)),
            ("reconstruction", "/images/oli9.jpg", 1100.0, 200.0, 450.0, 350.0, parallax(0.5)),
            ("light", "/images/oli10.jpg", 600.0, 80.0, 700.0, 450.0, parallax(0.8)),
            ("light", "/images/oli11.jpg", 1500.0, 150.0, 600.0, 400.0, reveal(600.0)),
        ];

        let photos = table
            .iter()
            .filter_map(|&(level_id, src, offset, y, w, h, mode)| {
                let index = levels.levels().iter().position(|l| l.id == level_id)?;
                let start = levels.level_start(index);
                Some(LayerPhoto::new(src, level_id, start + offset, y, (w, h), mode))
            })
            .collect();

        Self { photos }
    }

    pub fn update(&mut self, player_x: f64, scroll_position: f64) {
        for photo in &mut self.photos {
            photo.update(player_x, scroll_position);
        }
    }

    pub fn photos(&self) -> &[LayerPhoto] {
        &self.photos
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

//! Lignes de Vie - a scroll-driven walk through five chapters of a life
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, physics, reveal, per-frame tick)
//! - `layers`: Per-level photo layers (reveal, parallax, visual filters)
//! - `render`: Drawing-surface contract and the frame painter
//! - `platform`: Browser host (canvas, animation frame loop, listeners)
//! - `dream`: Text-response collaborator with literary fallbacks

pub mod audio;
pub mod dream;
pub mod images;
pub mod input;
pub mod layers;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};
pub use sim::{Experience, SimEvent};

/// Tuning constants
pub mod consts {
    /// Fixed simulation timestep (the frame-based constants assume 60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default canvas height in pixels
    pub const CANVAS_HEIGHT: f64 = 600.0;
    /// Vertical margin the line never crosses
    pub const PLAYER_MARGIN: f64 = 80.0;
    /// Fraction of the gap to the pointer closed each frame
    pub const POINTER_DAMPING: f64 = 0.05;
    /// Fraction of the gap to the centerline closed each frame
    pub const CENTER_PULL: f64 = 0.02;
    pub const TRAIL_CAPACITY: usize = 100;

    /// Ambient particles (medium quality)
    pub const AMBIENT_PARTICLES: usize = 50;
    /// Leftward scroll of ambient particles, pixels per frame
    pub const PARTICLE_DRIFT: f64 = 1.0;
    pub const PARTICLE_WRAP_MARGIN: f64 = 10.0;

    /// Pickups
    pub const COLLECT_RADIUS: f64 = 40.0;
    pub const COLLECT_SCORE: u64 = 10;
    pub const COLLECTIBLE_FLOAT_AMPLITUDE: f64 = 10.0;
    /// Radians per millisecond
    pub const COLLECTIBLE_FLOAT_RATE: f64 = 0.003;

    /// Bursts
    pub const COLLECT_BURST_PARTICLES: usize = 15;
    pub const COLLECT_EFFECT_LIFE: u32 = 30;
    pub const ZONE_BURST_PARTICLES: usize = 6;
    pub const ZONE_EFFECT_LIFE: u32 = 20;
    pub const BURST_SPEED: f64 = 8.0;
    /// Extra upward kick on spawn
    pub const BURST_LIFT: f64 = 2.0;
    pub const EFFECT_GRAVITY: f64 = 0.3;
    pub const EFFECT_DRAG: f64 = 0.98;
    pub const EFFECT_MIN_RADIUS: f64 = 0.5;

    /// Photo and quote reveal
    pub const PHOTO_REVEAL_DISTANCE: f64 = 800.0;
    pub const QUOTE_REVEAL_DISTANCE: f64 = 600.0;
    pub const REVEAL_EXPONENT: f64 = 1.2;
    pub const PHOTO_REVEAL_SMOOTHING: f64 = 0.08;
    pub const PHOTO_FADE_START_X: f64 = -1500.0;
    pub const PHOTO_FADE_DISTANCE: f64 = 2000.0;
    /// Gap between the polaroid's right edge and its caption
    pub const PHOTO_TEXT_OFFSET: f64 = 60.0;
    pub const POLAROID_PADDING: f64 = 12.0;
    pub const POLAROID_BOTTOM_PADDING: f64 = 40.0;
    pub const TITLE_CURSOR_BLINK_MS: f64 = 400.0;
    pub const BODY_CURSOR_BLINK_MS: f64 = 500.0;

    /// Chrome
    pub const NAV_HEIGHT: f64 = 45.0;
    pub const GRID_SPACING: f64 = 120.0;
}

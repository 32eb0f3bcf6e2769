//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must stay deterministic:
//! - Seeded RNG and seeded noise only, owned by the `Experience`
//! - Stable iteration order (manifest order)
//! - No rendering or platform dependencies
//!
//! Wall-clock time enters only through `FrameInput::now_ms` and only feeds
//! decorative animation.

pub mod levels;
pub mod manifest;
pub mod noise;
pub mod physics;
pub mod reveal;
pub mod scroll;
pub mod state;
pub mod tick;

pub use levels::{Level, LevelPhysics, LevelTable, LevelVisual, Rgb};
pub use manifest::{ManifestError, WorldManifest};
pub use noise::NoiseGenerator;
pub use reveal::{InstantProximityReveal, SmoothedProximityReveal};
pub use scroll::{ObstacleCeiling, ScrollMapper, ScrollMetrics};
pub use state::{
    BackgroundPhoto, Collectible, CollectibleKind, EffectKind, Experience, InspirationalQuote,
    InteractiveZone, Particle, PhotoSide, Player, SimEvent, VisualEffect, ZoneKind,
};
pub use tick::tick;

//! Simulation context and entity types
//!
//! `Experience` owns everything the frame loop mutates: the line, the
//! ambient particles, pickups, zones, bursts, photos and quotes. It is built
//! explicitly from a seed and manifests; there is no global state.

use std::collections::VecDeque;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::levels::{LevelTable, Rgb};
use super::manifest::{
    CollectibleSpec, PhotoSpec, QuoteSpec, WorldManifest, ZoneSpec, id_number,
};
use super::noise::NoiseGenerator;
use crate::consts::*;
use crate::layers::PhotoLayer;

pub use super::manifest::{CollectibleKind, PhotoSide, ZoneKind};

/// The line the reader steers. `pos.x` is pinned to the viewport center.
#[derive(Debug, Clone)]
pub struct Player {
    /// Screen-space position
    pub pos: DVec2,
    pub vel: DVec2,
    /// Recent positions, oldest first
    pub trail: VecDeque<DVec2>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }
}

impl Player {
    /// Append the current position, evicting the oldest past capacity
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_CAPACITY {
            self.trail.pop_front();
        }
    }
}

/// Ambient dust/star particle (screen space, recycled at the left edge)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: DVec2,
    pub size: f64,
    pub vel: DVec2,
    pub opacity: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub id: String,
    /// World position at rest
    pub pos: DVec2,
    pub kind: CollectibleKind,
    pub collected: bool,
    /// Float animation phase
    pub phase: f64,
    /// Current vertical float offset
    pub bob: f64,
}

impl Collectible {
    pub fn from_spec(spec: &CollectibleSpec, index: usize) -> Self {
        Self {
            id: spec.id.clone(),
            pos: DVec2::new(spec.world_x, spec.world_y),
            kind: spec.kind,
            collected: false,
            phase: id_number(&spec.id).unwrap_or(index as u32 + 1) as f64,
            bob: 0.0,
        }
    }

    /// World position including the float offset
    pub fn world_pos(&self) -> DVec2 {
        DVec2::new(self.pos.x, self.pos.y + self.bob)
    }
}

/// Rectangle that modifies the line's velocity while the line is inside
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveZone {
    pub id: String,
    /// World center
    pub center: DVec2,
    pub size: DVec2,
    pub kind: ZoneKind,
    pub strength: f64,
    pub active: bool,
}

impl InteractiveZone {
    pub fn from_spec(spec: &ZoneSpec) -> Self {
        Self {
            id: spec.id.clone(),
            center: DVec2::new(spec.world_x, spec.world_y),
            size: DVec2::new(spec.width, spec.height),
            kind: spec.kind,
            strength: spec.strength,
            active: false,
        }
    }

    /// Inclusive point-in-rectangle test (world space)
    pub fn contains(&self, point: DVec2) -> bool {
        let half = self.size * 0.5;
        point.x >= self.center.x - half.x
            && point.x <= self.center.x + half.x
            && point.y >= self.center.y - half.y
            && point.y <= self.center.y + half.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Collect,
    ZoneBurst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectParticle {
    /// World position
    pub pos: DVec2,
    pub vel: DVec2,
    pub size: f64,
    pub color: Rgb,
}

/// Short-lived particle burst
#[derive(Debug, Clone, PartialEq)]
pub struct VisualEffect {
    pub id: u32,
    pub origin: DVec2,
    pub kind: EffectKind,
    pub life: u32,
    pub max_life: u32,
    pub particles: Vec<EffectParticle>,
}

impl VisualEffect {
    /// Fraction of the lifetime already spent, in [0, 1]
    pub fn age(&self) -> f64 {
        if self.max_life == 0 {
            1.0
        } else {
            (self.life as f64 / self.max_life as f64).min(1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life < self.max_life
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPhoto {
    pub id: String,
    pub pos: DVec2,
    pub image_url: String,
    pub title: String,
    pub text: String,
    pub side: PhotoSide,
    pub size: DVec2,
    /// Smoothed reveal in [0, 1]
    pub reveal_progress: f64,
    /// Float animation phase
    pub phase: f64,
}

impl BackgroundPhoto {
    pub fn from_spec(spec: &PhotoSpec, index: usize) -> Self {
        Self {
            id: spec.id.clone(),
            pos: DVec2::new(spec.world_x, spec.world_y),
            image_url: spec.image_url.clone(),
            title: spec.title.clone(),
            text: spec.text.clone(),
            side: spec.side,
            size: DVec2::new(spec.width, spec.height),
            reveal_progress: 0.0,
            phase: id_number(&spec.id).unwrap_or(index as u32 + 1) as f64,
        }
    }

    /// Outer size of the polaroid frame around the image
    pub fn polaroid_size(&self) -> DVec2 {
        DVec2::new(
            self.size.x + POLAROID_PADDING * 2.0,
            self.size.y + POLAROID_PADDING + POLAROID_BOTTOM_PADDING,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspirationalQuote {
    pub id: String,
    pub pos: DVec2,
    pub text: String,
    /// Recomputed every frame
    pub reveal_progress: f64,
}

impl InspirationalQuote {
    pub fn from_spec(spec: &QuoteSpec) -> Self {
        Self {
            id: spec.id.clone(),
            pos: DVec2::new(spec.world_x, spec.world_y),
            text: spec.text.clone(),
            reveal_progress: 0.0,
        }
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Collected { id: String, kind: CollectibleKind, score: u64 },
    ZoneEntered { id: String, kind: ZoneKind },
    LevelChanged { from: Option<usize>, to: usize, id: String },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct Experience {
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub noise: NoiseGenerator,
    pub levels: LevelTable,
    pub player: Player,
    pub particles: Vec<Particle>,
    pub collectibles: Vec<Collectible>,
    pub zones: Vec<InteractiveZone>,
    pub effects: Vec<VisualEffect>,
    pub photos: Vec<BackgroundPhoto>,
    pub quotes: Vec<InspirationalQuote>,
    pub layers: PhotoLayer,
    pub score: u64,
    /// Simulation tick counter
    pub frame: u64,
    /// Level the line was in on the last tick
    pub level_index: Option<usize>,
    /// World x of the line (from the scroll mapper)
    pub world_x: f64,
    /// Viewport size in pixels as of the last tick
    pub viewport: DVec2,
    /// Wall clock of the last tick (decorative animation)
    pub now_ms: f64,
    /// How many ambient particles to spawn once the viewport is known
    pub ambient_particle_count: usize,
    pub events: Vec<SimEvent>,
    next_effect_id: u32,
}

impl Experience {
    /// The shipped story with the given seed
    pub fn new(seed: u64) -> Self {
        let levels = LevelTable::default();
        let layers = PhotoLayer::for_levels(&levels);
        Self::from_parts(seed, levels, &WorldManifest::default(), layers)
    }

    pub fn from_parts(
        seed: u64,
        levels: LevelTable,
        world: &WorldManifest,
        layers: PhotoLayer,
    ) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            noise: NoiseGenerator::new(seed),
            levels,
            player: Player::default(),
            particles: Vec::new(),
            collectibles: world
                .collectibles
                .iter()
                .enumerate()
                .map(|(i, c)| Collectible::from_spec(c, i))
                .collect(),
            zones: world.zones.iter().map(InteractiveZone::from_spec).collect(),
            effects: Vec::new(),
            photos: world
                .photos
                .iter()
                .enumerate()
                .map(|(i, p)| BackgroundPhoto::from_spec(p, i))
                .collect(),
            quotes: world.quotes.iter().map(InspirationalQuote::from_spec).collect(),
            layers,
            score: 0,
            frame: 0,
            level_index: None,
            world_x: 0.0,
            viewport: DVec2::ZERO,
            now_ms: 0.0,
            ambient_particle_count: AMBIENT_PARTICLES,
            events: Vec::new(),
            next_effect_id: 1,
        }
    }

    pub fn with_ambient_particles(mut self, count: usize) -> Self {
        self.ambient_particle_count = count;
        self
    }

    /// Level the line was in on the last tick (first level before any tick)
    pub fn current_level(&self) -> &super::levels::Level {
        self.levels.current_level(self.world_x)
    }

    /// Fraction of the world covered, in [0, 1]
    pub fn global_progress(&self) -> f64 {
        self.levels.global_progress(self.world_x)
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Convert a world x to screen x for the current viewport
    pub fn world_to_screen_x(&self, world_x: f64) -> f64 {
        world_x - self.world_x + self.viewport.x / 2.0
    }

    /// Line position in world space
    pub fn player_world_pos(&self) -> DVec2 {
        DVec2::new(self.world_x, self.player.pos.y)
    }

    pub(crate) fn next_effect_id(&mut self) -> u32 {
        let id = self.next_effect_id;
        self.next_effect_id = self.next_effect_id.wrapping_add(1);
        id
    }

    /// Fill the ambient particle pool for a `width` x `height` viewport
    pub(crate) fn spawn_ambient_particles(&mut self, width: f64, height: f64, color: Rgb) {
        self.particles.clear();
        for _ in 0..self.ambient_particle_count {
            let particle = Particle {
                pos: DVec2::new(
                    self.rng.random::<f64>() * width,
                    self.rng.random::<f64>() * height,
                ),
                size: self.rng.random::<f64>() * 3.0 + 1.0,
                vel: DVec2::new(
                    (self.rng.random::<f64>() - 0.5) * 0.5,
                    (self.rng.random::<f64>() - 0.5) * 0.5,
                ),
                opacity: self.rng.random::<f64>() * 0.5,
                color,
            };
            self.particles.push(particle);
        }
    }

    /// Spawn a burst of `count` particles at `origin` (world space)
    pub(crate) fn spawn_burst(
        &mut self,
        origin: DVec2,
        kind: EffectKind,
        count: usize,
        max_life: u32,
        color: Rgb,
    ) {
        let id = self.next_effect_id();
        let particles = (0..count)
            .map(|_| EffectParticle {
                pos: origin,
                vel: DVec2::new(
                    (self.rng.random::<f64>() - 0.5) * BURST_SPEED,
                    (self.rng.random::<f64>() - 0.5) * BURST_SPEED - BURST_LIFT,
                ),
                size: self.rng.random::<f64>() * 4.0 + 2.0,
                color,
            })
            .collect();

        self.effects.push(VisualEffect {
            id,
            origin,
            kind,
            life: 0,
            max_life,
            particles,
        });
    }
}

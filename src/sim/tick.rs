//! Per-frame simulation step
//!
//! One call advances the whole experience by one frame. Order matters:
//! level lookup, ambient particles, the line, its trail, pickups, zones,
//! bursts, then the reveal state of photos, quotes and photo layers.

use glam::DVec2;

use super::levels::{LevelPhysics, Rgb};
use super::physics::FieldContext;
use super::reveal::{InstantProximityReveal, SmoothedProximityReveal};
use super::state::{EffectKind, Experience, SimEvent};
use crate::consts::*;
use crate::input::FrameInput;

/// Advance `exp` by one frame using the committed input snapshot.
/// A zero-sized viewport skips the frame entirely.
pub fn tick(exp: &mut Experience, input: &FrameInput) {
    if !input.has_viewport() {
        return;
    }

    let first_frame = exp.viewport.x <= 0.0 || exp.viewport.y <= 0.0;
    exp.viewport = input.viewport;
    exp.world_x = input.world_x;
    exp.now_ms = input.now_ms;
    exp.frame += 1;

    let width = input.viewport.x;
    let height = input.viewport.y;

    // 1. Level
    let index = exp.levels.current_index(exp.world_x);
    let (color, physics) = match exp.levels.get(index) {
        Some(level) => (level.color, level.physics),
        None => return,
    };
    if exp.level_index != Some(index) {
        let id = exp.levels.get(index).map(|l| l.id.clone()).unwrap_or_default();
        log::info!("Entering level {} ({})", index + 1, id);
        exp.events.push(SimEvent::LevelChanged {
            from: exp.level_index,
            to: index,
            id,
        });
        exp.level_index = Some(index);
    }

    if first_frame {
        exp.player.pos = DVec2::new(width / 2.0, height / 2.0);
        exp.player.vel = DVec2::ZERO;
        exp.spawn_ambient_particles(width, height, color);
    }

    // 2. Ambient particles
    update_particles(exp, width, height, color);

    // 3. The line
    update_player(exp, input, &physics);

    // 4. Trail
    exp.player.record_trail();

    // 5. Pickups
    update_collectibles(exp, color);

    // 6. Zones
    update_zones(exp, color);

    // 7. Bursts
    update_effects(exp);

    // 8. Photos and quotes
    update_reveals(exp);

    // 9. Layered photos
    exp.layers.update(exp.world_x, exp.world_x);
}

/// Drift left, recycle at the left edge
fn update_particles(exp: &mut Experience, width: f64, height: f64, color: Rgb) {
    use rand::Rng;

    let Experience { particles, rng, .. } = exp;
    for particle in particles.iter_mut() {
        particle.pos.x += particle.vel.x - PARTICLE_DRIFT;
        particle.pos.y += particle.vel.y;

        if particle.pos.x < -PARTICLE_WRAP_MARGIN {
            particle.pos.x = width + PARTICLE_WRAP_MARGIN;
            particle.pos.y = rng.random::<f64>() * height;
        }

        particle.color = color;
    }
}

/// Ease `y` toward the pointer
#[inline]
pub fn ease_toward_pointer(y: f64, pointer_y: f64) -> f64 {
    y + (pointer_y - y) * POINTER_DAMPING
}

/// Ease `y` toward the vertical center
#[inline]
pub fn ease_toward_center(y: f64, center_y: f64) -> f64 {
    y + (center_y - y) * CENTER_PULL
}

/// Keep `y` inside the vertical margins (centered when the view is too short)
#[inline]
pub fn clamp_to_margins(y: f64, height: f64) -> f64 {
    if height > PLAYER_MARGIN * 2.0 {
        y.clamp(PLAYER_MARGIN, height - PLAYER_MARGIN)
    } else {
        height / 2.0
    }
}

fn update_player(exp: &mut Experience, input: &FrameInput, physics: &LevelPhysics) {
    let width = input.viewport.x;
    let height = input.viewport.y;
    let center_y = height / 2.0;

    let Experience {
        player,
        zones,
        noise,
        rng,
        frame,
        world_x,
        ..
    } = exp;

    player.pos.x = width / 2.0;

    if input.hovering {
        player.pos.y = ease_toward_pointer(player.pos.y, input.pointer.y);
    }
    player.pos.y = ease_toward_center(player.pos.y, center_y);

    let field = FieldContext {
        noise,
        frame: *frame,
        world_x: *world_x,
        ambient_field: physics.force_fields,
    };
    let pos = DVec2::new(*world_x, player.pos.y);
    player.vel = physics.integrate(
        pos,
        player.vel,
        center_y,
        (width, height, PLAYER_MARGIN),
        zones,
        &field,
        rng,
    );

    player.pos.y = clamp_to_margins(player.pos.y + player.vel.y, height);
}

fn update_collectibles(exp: &mut Experience, color: Rgb) {
    let player = exp.player_world_pos();
    let now = exp.now_ms;
    let mut bursts = Vec::new();

    for collectible in exp.collectibles.iter_mut() {
        if collectible.collected {
            continue;
        }
        collectible.bob = (now * COLLECTIBLE_FLOAT_RATE + collectible.phase).sin()
            * COLLECTIBLE_FLOAT_AMPLITUDE;

        let at = collectible.world_pos();
        if at.distance(player) < COLLECT_RADIUS {
            collectible.collected = true;
            exp.score += COLLECT_SCORE;
            log::debug!("Collected {} (score {})", collectible.id, exp.score);
            exp.events.push(SimEvent::Collected {
                id: collectible.id.clone(),
                kind: collectible.kind,
                score: exp.score,
            });
            bursts.push(at);
        }
    }

    for origin in bursts {
        exp.spawn_burst(
            origin,
            EffectKind::Collect,
            COLLECT_BURST_PARTICLES,
            COLLECT_EFFECT_LIFE,
            color,
        );
    }
}

fn update_zones(exp: &mut Experience, color: Rgb) {
    let player = exp.player_world_pos();
    let mut entered = Vec::new();

    for zone in exp.zones.iter_mut() {
        let was_active = zone.active;
        zone.active = zone.contains(player);
        if zone.active && !was_active {
            log::debug!("Entered {:?} zone {}", zone.kind, zone.id);
            exp.events.push(SimEvent::ZoneEntered {
                id: zone.id.clone(),
                kind: zone.kind,
            });
            entered.push(player);
        }
    }

    for origin in entered {
        exp.spawn_burst(
            origin,
            EffectKind::ZoneBurst,
            ZONE_BURST_PARTICLES,
            ZONE_EFFECT_LIFE,
            color,
        );
    }
}

/// Integrate burst particles, age every burst and drop the finished ones
pub fn update_effects(exp: &mut Experience) {
    for effect in exp.effects.iter_mut() {
        for p in effect.particles.iter_mut() {
            p.pos += p.vel;
            p.vel.y += EFFECT_GRAVITY;
            p.vel.x *= EFFECT_DRAG;
        }
        effect.life += 1;
    }
    exp.effects.retain(|e| e.is_alive());
}

fn update_reveals(exp: &mut Experience) {
    let smoothed = SmoothedProximityReveal::default();
    let instant = InstantProximityReveal::default();
    let world_x = exp.world_x;
    let half_width = exp.viewport.x / 2.0;

    for photo in exp.photos.iter_mut() {
        let screen_x = photo.pos.x - world_x + half_width;
        let caption_x = screen_x + photo.polaroid_size().x / 2.0 + PHOTO_TEXT_OFFSET;
        let target = smoothed.target(world_x, photo.pos.x, caption_x);
        photo.reveal_progress = smoothed.step(photo.reveal_progress, target);
    }

    for quote in exp.quotes.iter_mut() {
        quote.reveal_progress = instant.progress(world_x, quote.pos.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::PhotoLayer;
    use crate::sim::levels::LevelTable;
    use crate::sim::manifest::WorldManifest;
    use crate::sim::state::ZoneKind;
    use proptest::prelude::*;

    fn frame(world_x: f64) -> FrameInput {
        FrameInput {
            world_x,
            pointer: DVec2::ZERO,
            hovering: false,
            viewport: DVec2::new(800.0, 600.0),
            now_ms: 0.0,
        }
    }

    fn empty_world(seed: u64) -> Experience {
        let empty = WorldManifest {
            collectibles: Vec::new(),
            zones: Vec::new(),
            photos: Vec::new(),
            quotes: Vec::new(),
        };
        Experience::from_parts(seed, LevelTable::default(), &empty, PhotoLayer::default())
    }

    #[test]
    fn test_zero_viewport_skips_frame() {
        let mut exp = Experience::new(1);
        let input = FrameInput::default();
        tick(&mut exp, &input);
        assert_eq!(exp.frame, 0);
        assert!(exp.particles.is_empty());
        assert!(exp.events.is_empty());
    }

    #[test]
    fn test_first_frame_initializes() {
        let mut exp = Experience::new(1);
        tick(&mut exp, &frame(0.0));
        assert_eq!(exp.frame, 1);
        assert_eq!(exp.particles.len(), AMBIENT_PARTICLES);
        assert_eq!(exp.player.pos.x, 400.0);
        assert!((80.0..=520.0).contains(&exp.player.pos.y));
        assert_eq!(exp.player.trail.len(), 1);
    }

    #[test]
    fn test_pointer_damping_scenario() {
        assert!((ease_toward_pointer(300.0, 400.0) - 305.0).abs() < 1e-12);
        assert!((ease_toward_center(305.0, 300.0) - 304.9).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_to_margins() {
        assert_eq!(clamp_to_margins(10.0, 600.0), 80.0);
        assert_eq!(clamp_to_margins(590.0, 600.0), 520.0);
        assert_eq!(clamp_to_margins(300.0, 600.0), 300.0);
        // Viewport too short for the margins
        assert_eq!(clamp_to_margins(10.0, 100.0), 50.0);
    }

    #[test]
    fn test_level_change_events() {
        let mut exp = empty_world(3);
        tick(&mut exp, &frame(0.0));
        tick(&mut exp, &frame(100.0));
        tick(&mut exp, &frame(2500.0));
        let events = exp.drain_events();
        assert_eq!(
            events,
            vec![
                SimEvent::LevelChanged { from: None, to: 0, id: "chaos".into() },
                SimEvent::LevelChanged { from: Some(0), to: 1, id: "constraint".into() },
            ]
        );
        assert!(exp.events.is_empty());
    }

    #[test]
    fn test_collection_is_idempotent() {
        let mut exp = Experience::new(5);
        let mut input = frame(0.0);
        tick(&mut exp, &input);

        // Park the line next to s1 (500, 150)
        input.world_x = 500.0;
        input.hovering = true;
        input.pointer = DVec2::new(400.0, 150.0);
        exp.player.pos.y = 150.0;
        exp.player.vel = DVec2::ZERO;
        tick(&mut exp, &input);

        let s1 = &exp.collectibles[0];
        assert!(s1.collected);
        assert_eq!(exp.score, 10);
        let collect_bursts: Vec<_> = exp
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::Collect)
            .collect();
        assert_eq!(collect_bursts.len(), 1);
        assert_eq!(collect_bursts[0].particles.len(), COLLECT_BURST_PARTICLES);

        for _ in 0..20 {
            exp.player.pos.y = 150.0;
            tick(&mut exp, &input);
        }
        assert!(exp.collectibles[0].collected);
        assert_eq!(exp.score, 10);
        let collected_events = exp
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::Collected { .. }))
            .count();
        assert_eq!(collected_events, 1);
    }

    #[test]
    fn test_far_collectibles_untouched() {
        let mut exp = Experience::new(5);
        tick(&mut exp, &frame(3000.0));
        assert!(exp.collectibles.iter().all(|c| !c.collected));
        assert_eq!(exp.score, 0);
    }

    #[test]
    fn test_effect_removed_on_exact_frame() {
        let mut exp = empty_world(8);
        tick(&mut exp, &frame(0.0));
        let origin = DVec2::new(10.0, 10.0);
        exp.spawn_burst(origin, EffectKind::Collect, 15, COLLECT_EFFECT_LIFE, Rgb::WHITE);

        for _ in 0..(COLLECT_EFFECT_LIFE - 1) {
            tick(&mut exp, &frame(0.0));
        }
        assert_eq!(exp.effects.len(), 1);
        assert_eq!(exp.effects[0].life, COLLECT_EFFECT_LIFE - 1);

        tick(&mut exp, &frame(0.0));
        assert!(exp.effects.is_empty());
    }

    #[test]
    fn test_effect_particles_fall_and_drag() {
        let mut exp = empty_world(8);
        exp.spawn_burst(DVec2::ZERO, EffectKind::Collect, 1, 30, Rgb::WHITE);
        exp.effects[0].particles[0].vel = DVec2::new(2.0, -2.0);
        update_effects(&mut exp);
        let p = &exp.effects[0].particles[0];
        assert_eq!(p.pos, DVec2::new(2.0, -2.0));
        assert!((p.vel.x - 1.96).abs() < 1e-12);
        assert!((p.vel.y + 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_zone_entry_event_once() {
        let mut exp = Experience::new(2);
        let mut input = frame(800.0);
        input.hovering = true;
        input.pointer = DVec2::new(400.0, 300.0);
        tick(&mut exp, &input);
        assert!(exp.zones[0].active);
        tick(&mut exp, &input);

        let entries: Vec<_> = exp
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::ZoneEntered { .. }))
            .collect();
        assert_eq!(
            entries,
            vec![SimEvent::ZoneEntered { id: "w1".into(), kind: ZoneKind::Wind }]
        );
        assert!(exp.effects.iter().any(|e| e.kind == EffectKind::ZoneBurst));

        tick(&mut exp, &frame(1500.0));
        assert!(!exp.zones[0].active);
    }

    fn world_with_zones(zones: Vec<crate::sim::manifest::ZoneSpec>) -> Experience {
        let manifest = WorldManifest {
            zones,
            ..WorldManifest::default()
        };
        Experience::from_parts(9, LevelTable::default(), &manifest, PhotoLayer::default())
    }

    #[test]
    fn test_zone_pushes_on_entry_frame() {
        let gravity_only: Vec<_> = WorldManifest::default()
            .zones
            .into_iter()
            .filter(|z| z.id == "g1")
            .collect();
        let mut with_zone = world_with_zones(gravity_only);
        let mut without = world_with_zones(Vec::new());

        for exp in [&mut with_zone, &mut without] {
            tick(exp, &frame(1000.0));
        }
        assert_eq!(with_zone.player.vel, without.player.vel);

        // g1 spans x 2125..2275, y 125..375 with strength 1.5
        for exp in [&mut with_zone, &mut without] {
            tick(exp, &frame(2200.0));
        }
        assert!(with_zone.zones[0].active);
        let extra = with_zone.player.vel.y - without.player.vel.y;
        assert!((extra - 0.3).abs() < 1e-9, "extra push {extra}");
    }

    #[test]
    fn test_zone_stops_on_exit_frame() {
        let mut exp = Experience::new(9);
        tick(&mut exp, &frame(1000.0));
        tick(&mut exp, &frame(2200.0));
        assert!(exp.zones.iter().any(|z| z.id == "g1" && z.active));

        // Identical state apart from the zones
        let mut without = exp.clone();
        without.zones.clear();

        tick(&mut exp, &frame(2400.0));
        tick(&mut without, &frame(2400.0));
        assert!(exp.zones.iter().all(|z| !z.active));
        assert_eq!(exp.player.vel, without.player.vel);
    }

    #[test]
    fn test_particles_wrap_to_right_edge() {
        let mut exp = empty_world(4);
        tick(&mut exp, &frame(0.0));
        exp.particles[0].pos.x = -10.5;
        exp.particles[0].vel = DVec2::ZERO;
        tick(&mut exp, &frame(0.0));
        assert_eq!(exp.particles[0].pos.x, 810.0);
        assert!((0.0..600.0).contains(&exp.particles[0].pos.y));
    }

    #[test]
    fn test_photo_reveal_smooths_toward_target() {
        let mut exp = Experience::new(6);
        tick(&mut exp, &frame(400.0));
        let first = exp.photos[0].reveal_progress;
        assert!((first - 0.08).abs() < 1e-12);
        tick(&mut exp, &frame(400.0));
        assert!(exp.photos[0].reveal_progress > first);
        // Far ahead photos stay hidden
        assert_eq!(exp.photos[11].reveal_progress, 0.0);
    }

    #[test]
    fn test_quote_reveal_is_instant() {
        let mut exp = Experience::new(6);
        tick(&mut exp, &frame(8600.0));
        assert_eq!(exp.quotes[0].reveal_progress, 1.0);
        tick(&mut exp, &frame(9300.0));
        assert_eq!(exp.quotes[0].reveal_progress, 0.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Experience::new(77);
        let mut b = Experience::new(77);
        for i in 0..120 {
            let input = frame(i as f64 * 40.0);
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.score, b.score);
        assert_eq!(a.particles, b.particles);
    }

    proptest! {
        #[test]
        fn prop_player_stays_inside_margins(
            seed in any::<u64>(),
            steps in proptest::collection::vec(
                (0.0f64..10_500.0, 0.0f64..600.0, any::<bool>()),
                1..80,
            ),
        ) {
            let mut exp = Experience::new(seed);
            for (world_x, pointer_y, hovering) in steps {
                let input = FrameInput {
                    world_x,
                    pointer: DVec2::new(400.0, pointer_y),
                    hovering,
                    viewport: DVec2::new(800.0, 600.0),
                    now_ms: world_x,
                };
                tick(&mut exp, &input);
                prop_assert!(exp.player.pos.y >= PLAYER_MARGIN);
                prop_assert!(exp.player.pos.y <= 600.0 - PLAYER_MARGIN);
                prop_assert!(exp.player.trail.len() <= TRAIL_CAPACITY);
            }
        }
    }
}

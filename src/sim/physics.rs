//! Physics kernel for the line
//!
//! Every transform is a pure function of its inputs: take the current
//! velocity (and sometimes position), return the new velocity. Nothing in
//! here keeps state between calls; randomness comes in through the caller's
//! RNG and noise generator.

use glam::DVec2;
use rand::Rng;

use super::levels::LevelPhysics;
use super::noise::NoiseGenerator;
use super::state::{InteractiveZone, ZoneKind};

/// Restitution applied when the line hits the top/bottom padding band
pub const BOUNCE_RESTITUTION: f64 = 0.5;
/// Scale applied to `stability_factor` when pulling toward the centerline
pub const STABILIZE_SCALE: f64 = 0.01;

/// Scale every component by `friction` (expected < 1, decays speed)
#[inline]
pub fn apply_friction(v: DVec2, friction: f64) -> DVec2 {
    v * friction
}

/// Add `gravity` to the y component (subtract when inverted)
#[inline]
pub fn apply_gravity(v: DVec2, gravity: f64, inverted: bool) -> DVec2 {
    let g = if inverted { -gravity } else { gravity };
    DVec2::new(v.x, v.y + g)
}

/// Add independent uniform noise in [-strength/2, strength/2] to both axes
pub fn apply_turbulence<R: Rng + ?Sized>(v: DVec2, strength: f64, rng: &mut R) -> DVec2 {
    if strength <= 0.0 {
        return v;
    }
    let nx = (rng.random::<f64>() - 0.5) * strength;
    let ny = (rng.random::<f64>() - 0.5) * strength;
    DVec2::new(v.x + nx, v.y + ny)
}

/// Rescale `v` to exactly `max_speed` if it is faster, preserving direction
#[inline]
pub fn clamp_speed(v: DVec2, max_speed: f64) -> DVec2 {
    let speed = v.length();
    if speed > max_speed && speed > 0.0 {
        v * (max_speed / speed)
    } else {
        v
    }
}

/// Linear pull of `v.y` toward `target_y` (no damping term of its own)
#[inline]
pub fn stabilize_y(pos: DVec2, v: DVec2, target_y: f64, stability_factor: f64) -> DVec2 {
    let force = (target_y - pos.y) * stability_factor * STABILIZE_SCALE;
    DVec2::new(v.x, v.y + force)
}

/// Reflect `v.y` (half-elastic) when `pos.y` is inside the padding band.
/// Position is left untouched.
pub fn check_bounds(pos: DVec2, v: DVec2, _width: f64, height: f64, padding: f64) -> DVec2 {
    if pos.y < padding {
        DVec2::new(v.x, v.y.abs() * BOUNCE_RESTITUTION)
    } else if pos.y > height - padding {
        DVec2::new(v.x, -v.y.abs() * BOUNCE_RESTITUTION)
    } else {
        v
    }
}

/// Inputs the force-field pass needs besides position/velocity
pub struct FieldContext<'a> {
    pub noise: &'a NoiseGenerator,
    /// Simulation frame counter (drives gust evolution)
    pub frame: u64,
    /// Player's world x (samples the ambient field)
    pub world_x: f64,
    /// Whether the current level carries an ambient force field
    pub ambient_field: bool,
}

/// Apply the zones containing `pos` (and the level's ambient field) to `v`.
///
/// Containment is tested here against the current position, not read from
/// the zones' `active` flags, which still describe the previous frame while
/// the line is being integrated:
/// - wind: noisy vertical gust plus a small lateral push
/// - gravity: extra downward pull
/// - bounce: pushes away from the zone's horizontal midline
/// - slow: multiplicative damping by `strength`
pub fn apply_force_field(
    pos: DVec2,
    v: DVec2,
    zones: &[InteractiveZone],
    field: &FieldContext<'_>,
) -> DVec2 {
    let mut v = v;

    for (index, zone) in zones.iter().enumerate() {
        if !zone.contains(pos) {
            continue;
        }
        match zone.kind {
            ZoneKind::Wind => {
                let gust = field.noise.octave_noise_2d(
                    field.frame as f64 * 0.02,
                    index as f64 + 0.5,
                    3,
                    0.5,
                );
                v.y += gust * 0.6 * zone.strength;
                v.x += 0.1 * zone.strength;
            }
            ZoneKind::Gravity => {
                v.y += 0.2 * zone.strength;
            }
            ZoneKind::Bounce => {
                let away = pos.y - zone.center.y;
                // signum(0.0) is 1.0; a dead-center line is pushed down
                v.y += away.signum() * 0.15 * zone.strength;
            }
            ZoneKind::Slow => {
                v *= zone.strength.clamp(0.0, 1.0);
            }
        }
    }

    if field.ambient_field {
        let n = field.noise.octave_noise_2d(
            field.world_x * 0.004,
            field.frame as f64 * 0.01,
            3,
            0.5,
        );
        v.y += n * 0.25;
    }

    v
}

/// Run the full per-frame pipeline for one level:
/// friction → gravity → turbulence → force fields → clamp → stabilize → bounds
#[allow(clippy::too_many_arguments)]
pub fn integrate<R: Rng + ?Sized>(
    pos: DVec2,
    v: DVec2,
    physics: &LevelPhysics,
    center_y: f64,
    bounds: (f64, f64, f64),
    zones: &[InteractiveZone],
    field: &FieldContext<'_>,
    rng: &mut R,
) -> DVec2 {
    let (width, height, padding) = bounds;

    let v = apply_friction(v, physics.friction);
    let v = apply_gravity(v, physics.gravity, physics.invert_gravity);
    let v = apply_turbulence(v, physics.turbulence, rng);
    let v = apply_force_field(pos, v, zones, field);
    let v = clamp_speed(v, physics.max_speed);
    let v = stabilize_y(pos, v, center_y, physics.stability_factor);
    check_bounds(pos, v, width, height, padding)
}

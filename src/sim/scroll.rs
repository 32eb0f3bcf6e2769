//! Scroll-to-world mapping
//!
//! The page scrolls vertically; the world moves horizontally. Vertical
//! scroll progress is stretched over the full world width, then passed
//! through an obstacle ceiling that can hold the line back and never lets
//! the world position move backwards.

/// Document scroll geometry as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Scroll progress in [0, 1]; zero when the document does not scroll
    pub fn progress(&self) -> f64 {
        let scrollable = self.scroll_height - self.viewport_height;
        if scrollable > 0.0 {
            (self.scroll_top / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Gate driven by an external obstacle controller plus a high-water mark
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleCeiling {
    /// Furthest world x the line may reach (`INFINITY` when open)
    gate: f64,
    /// Highest position ever granted
    max_reached: f64,
    blocked: bool,
}

impl Default for ObstacleCeiling {
    fn default() -> Self {
        Self {
            gate: f64::INFINITY,
            max_reached: 0.0,
            blocked: false,
        }
    }
}

impl ObstacleCeiling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `candidate` to the gate, raise the high-water mark and return it.
    /// Successive results never decrease until `reset`.
    pub fn grant(&mut self, candidate: f64) -> f64 {
        if !candidate.is_finite() {
            return self.max_reached;
        }
        let clamped = candidate.min(self.gate);
        if clamped > self.max_reached {
            self.max_reached = clamped;
        }
        self.max_reached
    }

    /// Hold the line at `x`
    pub fn block_at(&mut self, x: f64) {
        self.gate = x;
        self.blocked = true;
        log::debug!("Obstacle gate closed at {x:.0}");
    }

    /// Move a closed gate forward (never backwards). No effect when open.
    pub fn advance_gate(&mut self, x: f64) {
        if self.gate.is_finite() && x > self.gate {
            self.gate = x;
        }
    }

    /// Open the gate completely
    pub fn release(&mut self) {
        self.gate = f64::INFINITY;
        self.blocked = false;
    }

    /// Open the gate and forget the high-water mark
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn gate(&self) -> f64 {
        self.gate
    }

    pub fn max_reached(&self) -> f64 {
        self.max_reached
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// Maps document scroll to a world x position
#[derive(Debug, Clone)]
pub struct ScrollMapper {
    total_width: f64,
    ceiling: ObstacleCeiling,
}

impl ScrollMapper {
    pub fn new(total_width: f64) -> Self {
        Self {
            total_width,
            ceiling: ObstacleCeiling::default(),
        }
    }

    /// Unconstrained world position for these metrics
    pub fn candidate(&self, metrics: &ScrollMetrics) -> f64 {
        metrics.progress() * self.total_width
    }

    /// World position after the obstacle ceiling
    pub fn map(&mut self, metrics: &ScrollMetrics) -> f64 {
        let candidate = self.candidate(metrics);
        self.ceiling.grant(candidate)
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn ceiling(&self) -> &ObstacleCeiling {
        &self.ceiling
    }

    pub fn ceiling_mut(&mut self) -> &mut ObstacleCeiling {
        &mut self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        }
    }

    #[test]
    fn test_progress_mapping() {
        assert_eq!(metrics(0.0).progress(), 0.0);
        assert_eq!(metrics(500.0).progress(), 0.5);
        assert_eq!(metrics(5000.0).progress(), 1.0);
        assert_eq!(metrics(-20.0).progress(), 0.0);
    }

    #[test]
    fn test_non_scrollable_document() {
        let m = ScrollMetrics {
            scroll_top: 100.0,
            scroll_height: 800.0,
            viewport_height: 800.0,
        };
        assert_eq!(m.progress(), 0.0);
        assert_eq!(ScrollMapper::new(10_500.0).map(&m), 0.0);
    }

    #[test]
    fn test_mapper_scales_to_world() {
        let mut mapper = ScrollMapper::new(10_500.0);
        assert_eq!(mapper.map(&metrics(500.0)), 5250.0);
        assert_eq!(mapper.map(&metrics(1000.0)), 10_500.0);
    }

    #[test]
    fn test_gate_holds_then_releases() {
        let mut mapper = ScrollMapper::new(10_000.0);
        mapper.ceiling_mut().block_at(3000.0);
        assert!(mapper.ceiling().is_blocked());
        assert_eq!(mapper.map(&metrics(500.0)), 3000.0);

        mapper.ceiling_mut().advance_gate(4000.0);
        assert_eq!(mapper.map(&metrics(500.0)), 4000.0);

        // A gate behind the current gate is ignored
        mapper.ceiling_mut().advance_gate(1000.0);
        assert_eq!(mapper.ceiling().gate(), 4000.0);

        mapper.ceiling_mut().release();
        assert!(!mapper.ceiling().is_blocked());
        assert_eq!(mapper.map(&metrics(500.0)), 5000.0);
    }

    #[test]
    fn test_scrolling_back_keeps_high_water_mark() {
        let mut mapper = ScrollMapper::new(10_000.0);
        assert_eq!(mapper.map(&metrics(600.0)), 6000.0);
        assert_eq!(mapper.map(&metrics(100.0)), 6000.0);

        mapper.ceiling_mut().reset();
        assert_eq!(mapper.map(&metrics(100.0)), 1000.0);
    }

    #[test]
    fn test_advance_gate_on_open_ceiling_is_noop() {
        let mut ceiling = ObstacleCeiling::new();
        ceiling.advance_gate(500.0);
        assert_eq!(ceiling.gate(), f64::INFINITY);
    }

    proptest! {
        #[test]
        fn prop_grant_is_monotonic(
            steps in proptest::collection::vec(
                (0.0f64..20_000.0, proptest::option::of(0.0f64..20_000.0)),
                1..64,
            )
        ) {
            let mut ceiling = ObstacleCeiling::new();
            let mut last = 0.0;
            for (candidate, gate) in steps {
                match gate {
                    Some(g) if g < 10_000.0 => ceiling.block_at(g),
                    Some(_) => ceiling.release(),
                    None => {}
                }
                let granted = ceiling.grant(candidate);
                prop_assert!(granted >= last);
                last = granted;
            }
        }
    }
}

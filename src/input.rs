//! Double-buffered input
//!
//! Event handlers write into `pending` whenever the browser fires them; the
//! frame loop commits a snapshot once at the start of each frame so every
//! step of a tick sees the same values.

use glam::DVec2;

/// Everything a tick reads from the outside world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// World x granted by the scroll mapper
    pub world_x: f64,
    /// Pointer position relative to the canvas
    pub pointer: DVec2,
    /// Pointer is over the canvas
    pub hovering: bool,
    /// Canvas size in pixels
    pub viewport: DVec2,
    /// Wall clock in milliseconds (decorative animation only)
    pub now_ms: f64,
}

impl FrameInput {
    pub fn has_viewport(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    pending: FrameInput,
    committed: FrameInput,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_world_x(&mut self, world_x: f64) {
        self.pending.world_x = world_x;
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pending.pointer = DVec2::new(x, y);
        self.pending.hovering = true;
    }

    pub fn pointer_left(&mut self) {
        self.pending.hovering = false;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.pending.viewport = DVec2::new(width.max(0.0), height.max(0.0));
    }

    /// Snapshot `pending` for this frame and return it
    pub fn commit(&mut self, now_ms: f64) -> FrameInput {
        self.pending.now_ms = now_ms;
        self.committed = self.pending;
        self.committed
    }

    /// Snapshot taken by the last `commit`
    pub fn committed(&self) -> &FrameInput {
        &self.committed
    }

    pub fn pending(&self) -> &FrameInput {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_isolates_frame_from_later_events() {
        let mut input = InputBuffer::new();
        input.resize(800.0, 600.0);
        input.pointer_moved(10.0, 20.0);
        let frame = input.commit(16.0);

        input.pointer_moved(99.0, 99.0);
        input.pointer_left();

        assert_eq!(frame.pointer, DVec2::new(10.0, 20.0));
        assert!(frame.hovering);
        assert_eq!(input.committed().pointer, DVec2::new(10.0, 20.0));
        assert!(!input.pending().hovering);
    }

    #[test]
    fn test_has_viewport() {
        let mut input = InputBuffer::new();
        assert!(!input.commit(0.0).has_viewport());
        input.resize(800.0, 0.0);
        assert!(!input.commit(0.0).has_viewport());
        input.resize(800.0, 600.0);
        assert!(input.commit(0.0).has_viewport());
    }
}

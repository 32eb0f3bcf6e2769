//! End-to-end walk through the whole story, headless

use glam::DVec2;
use lifelines::audio::{AudioBus, Cue};
use lifelines::images::ImageCache;
use lifelines::input::InputBuffer;
use lifelines::render::{DrawCmd, FrameStyle, RecordedImage, RecordingSurface, draw_frame};
use lifelines::sim::{ScrollMapper, ScrollMetrics, SimEvent, tick};
use lifelines::Experience;

const VIEWPORT: DVec2 = DVec2::new(1200.0, 600.0);

fn metrics(fraction: f64) -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: fraction * 5400.0,
        scroll_height: 6000.0,
        viewport_height: 600.0,
    }
}

struct Walk {
    exp: Experience,
    mapper: ScrollMapper,
    input: InputBuffer,
    events: Vec<SimEvent>,
    step: u64,
}

impl Walk {
    fn new(seed: u64) -> Self {
        let exp = Experience::new(seed);
        let mapper = ScrollMapper::new(exp.levels.total_width());
        let mut input = InputBuffer::new();
        input.resize(VIEWPORT.x, VIEWPORT.y);
        Self {
            exp,
            mapper,
            input,
            events: Vec::new(),
            step: 0,
        }
    }

    fn frame(&mut self, fraction: f64) {
        let world_x = self.mapper.map(&metrics(fraction));
        self.input.set_world_x(world_x);
        let input = self.input.commit(self.step as f64 * 1000.0 / 60.0);
        tick(&mut self.exp, &input);
        self.events.extend(self.exp.drain_events());
        self.step += 1;
    }

    fn sweep(&mut self, from: f64, to: f64, frames: u32) {
        for i in 0..=frames {
            self.frame(from + (to - from) * i as f64 / frames as f64);
        }
    }
}

#[test]
fn test_full_sweep_visits_every_level_in_order() {
    let mut walk = Walk::new(3);
    walk.sweep(0.0, 1.0, 3000);

    let levels: Vec<&str> = walk
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::LevelChanged { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(levels, ["chaos", "constraint", "displacement", "reconstruction", "light"]);
    assert_eq!(walk.exp.world_x, walk.exp.levels.total_width());
    assert_eq!(walk.exp.global_progress(), 1.0);
}

#[test]
fn test_score_matches_collected_pickups() {
    let mut walk = Walk::new(5);
    walk.sweep(0.0, 1.0, 3000);

    let mut last = 0;
    let mut ids = Vec::new();
    for event in &walk.events {
        if let SimEvent::Collected { id, score, .. } = event {
            assert_eq!(*score, last + 10);
            last = *score;
            assert!(!ids.contains(id), "{id} collected twice");
            ids.push(id.clone());
        }
    }
    let collected = walk.exp.collectibles.iter().filter(|c| c.collected).count();
    assert_eq!(ids.len(), collected);
    assert_eq!(walk.exp.score, 10 * collected as u64);
}

#[test]
fn test_scrolling_back_keeps_position() {
    let mut walk = Walk::new(8);
    walk.sweep(0.0, 0.5, 600);
    let reached = walk.exp.world_x;
    walk.sweep(0.5, 0.1, 300);
    assert_eq!(walk.exp.world_x, reached);
    assert_eq!(walk.mapper.ceiling().max_reached(), reached);
}

#[test]
fn test_obstacle_gate_holds_the_line() {
    let mut walk = Walk::new(9);
    walk.mapper.ceiling_mut().block_at(3000.0);
    walk.sweep(0.0, 1.0, 1200);
    assert_eq!(walk.exp.world_x, 3000.0);
    assert!(walk.mapper.ceiling().is_blocked());

    walk.mapper.ceiling_mut().release();
    walk.frame(1.0);
    assert_eq!(walk.exp.world_x, walk.exp.levels.total_width());
}

#[test]
fn test_same_seed_same_walk() {
    let mut a = Walk::new(77);
    let mut b = Walk::new(77);
    a.sweep(0.0, 1.0, 900);
    b.sweep(0.0, 1.0, 900);
    assert_eq!(a.events, b.events);
    assert_eq!(a.exp.player.pos, b.exp.player.pos);
    assert_eq!(a.exp.particles, b.exp.particles);
}

#[test]
fn test_frames_paint_along_the_way() {
    let mut walk = Walk::new(12);
    let mut images = ImageCache::new();
    for photo in &walk.exp.photos {
        images.request(&photo.image_url, |url| Some(RecordedImage::loaded(url)));
    }
    let style = FrameStyle::default();

    let mut surface = RecordingSurface::new(VIEWPORT.x, VIEWPORT.y);
    for checkpoint in [0.05, 0.35, 0.65, 0.95] {
        walk.sweep(checkpoint - 0.05, checkpoint, 120);
        draw_frame(&mut surface, &walk.exp, &images, &style);
        assert!(surface.is_balanced());
        let percent = format!("{}%", (walk.exp.global_progress() * 100.0).floor() as u32);
        assert!(surface.texts().contains(&percent.as_str()));
        assert!(surface.count(|c| matches!(c, DrawCmd::FillRect(..))) > 0);
        surface.take_commands();
    }
}

#[test]
fn test_events_drive_audio() {
    let mut walk = Walk::new(4);
    let mut audio = AudioBus::default();
    audio.init();
    walk.sweep(0.0, 1.0, 1500);
    for event in &walk.events {
        audio.handle_event(event);
    }
    let played = audio.take_played();
    assert_eq!(played.iter().filter(|c| **c == Cue::LevelTransition).count(), 4);
    assert_eq!(audio.ambience(), Some("light"));
}

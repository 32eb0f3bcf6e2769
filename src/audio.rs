//! Audio bus
//!
//! Placeholder sound layer: it tracks which ambience should be playing and
//! logs cues, but synthesizes nothing. The simulation drives it through
//! `SimEvent`s so a real backend can slot in behind the same calls.

use crate::sim::SimEvent;

/// One-shot cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Pickup collected
    Collect,
    /// Line entered an interactive zone
    ZoneEnter,
    /// Crossed into a new level
    LevelTransition,
}

impl Cue {
    pub fn id(&self) -> &'static str {
        match self {
            Cue::Collect => "collect",
            Cue::ZoneEnter => "zone-enter",
            Cue::LevelTransition => "level-transition",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioBus {
    initialized: bool,
    master_volume: f32,
    ambience: Option<String>,
    /// Cues played since the last `take_played` (for hosts and tests)
    played: Vec<Cue>,
}

impl Default for AudioBus {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl AudioBus {
    pub fn new(master_volume: f32) -> Self {
        Self {
            initialized: false,
            master_volume: master_volume.clamp(0.0, 1.0),
            ambience: None,
            played: Vec::new(),
        }
    }

    /// Must be called from a user gesture on the web
    pub fn init(&mut self) {
        if !self.initialized {
            self.initialized = true;
            log::info!("Audio bus initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn play_sound(&mut self, cue: Cue, volume: f32) {
        if !self.initialized {
            return;
        }
        let volume = (volume * self.master_volume).clamp(0.0, 1.0);
        log::debug!("[audio] play {} at {:.2}", cue.id(), volume);
        self.played.push(cue);
    }

    /// Switch the looping ambience to the one for `level_id`
    pub fn set_ambience(&mut self, level_id: &str) {
        if self.ambience.as_deref() == Some(level_id) {
            return;
        }
        log::debug!("[audio] ambience -> {level_id}");
        self.ambience = Some(level_id.to_string());
    }

    pub fn ambience(&self) -> Option<&str> {
        self.ambience.as_deref()
    }

    pub fn stop_all(&mut self) {
        if self.ambience.take().is_some() {
            log::debug!("[audio] stop all");
        }
    }

    /// React to one simulation event
    pub fn handle_event(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Collected { .. } => self.play_sound(Cue::Collect, 1.0),
            SimEvent::ZoneEntered { .. } => self.play_sound(Cue::ZoneEnter, 0.6),
            SimEvent::LevelChanged { id, from, .. } => {
                if from.is_some() {
                    self.play_sound(Cue::LevelTransition, 0.8);
                }
                self.set_ambience(id);
            }
        }
    }

    pub fn take_played(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.played)
    }
}

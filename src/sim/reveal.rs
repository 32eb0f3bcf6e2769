//! Proximity reveal strategies and typewriter helpers
//!
//! Two strategies are kept apart on purpose: photographs approach their
//! target smoothly and linger after the line has passed, quotes simply
//! follow the current distance.

use crate::consts;

/// Exponentially smoothed reveal used by background photographs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedProximityReveal {
    /// Distance at which the reveal starts
    pub reveal_distance: f64,
    /// Easing exponent applied to the linear proximity
    pub exponent: f64,
    /// Fraction of the gap closed each frame
    pub smoothing: f64,
    /// Screen x (of the caption) where the fade-out begins
    pub fade_start_x: f64,
    /// Screen distance over which the fade-out completes
    pub fade_distance: f64,
}

impl Default for SmoothedProximityReveal {
    fn default() -> Self {
        Self {
            reveal_distance: consts::PHOTO_REVEAL_DISTANCE,
            exponent: consts::REVEAL_EXPONENT,
            smoothing: consts::PHOTO_REVEAL_SMOOTHING,
            fade_start_x: consts::PHOTO_FADE_START_X,
            fade_distance: consts::PHOTO_FADE_DISTANCE,
        }
    }
}

impl SmoothedProximityReveal {
    /// Target reveal for a photo at `photo_x` seen from `player_x` (both
    /// world units). `caption_screen_x` is where the caption would be drawn.
    ///
    /// - within `reveal_distance`: eased proximity
    /// - further ahead: hidden
    /// - further behind: fully shown until the caption leaves through the
    ///   fade window on the left
    pub fn target(&self, player_x: f64, photo_x: f64, caption_screen_x: f64) -> f64 {
        let distance = (player_x - photo_x).abs();

        let mut target = if distance < self.reveal_distance {
            (1.0 - distance / self.reveal_distance).powf(self.exponent)
        } else if photo_x > player_x {
            0.0
        } else {
            1.0
        };

        if caption_screen_x < self.fade_start_x && self.fade_distance > 0.0 {
            let fade = ((self.fade_start_x - caption_screen_x) / self.fade_distance).min(1.0);
            target = 1.0 - fade;
        }

        target.clamp(0.0, 1.0)
    }

    /// Move `current` a fixed fraction toward `target`, staying in [0, 1]
    pub fn step(&self, current: f64, target: f64) -> f64 {
        (current + (target - current) * self.smoothing).clamp(0.0, 1.0)
    }
}

/// Unsmoothed reveal used by closing quotes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantProximityReveal {
    pub reveal_distance: f64,
    pub exponent: f64,
}

impl Default for InstantProximityReveal {
    fn default() -> Self {
        Self {
            reveal_distance: consts::QUOTE_REVEAL_DISTANCE,
            exponent: consts::REVEAL_EXPONENT,
        }
    }
}

impl InstantProximityReveal {
    pub fn progress(&self, player_x: f64, quote_x: f64) -> f64 {
        let distance = (player_x - quote_x).abs();
        if distance < self.reveal_distance {
            (1.0 - distance / self.reveal_distance).powf(self.exponent)
        } else {
            0.0
        }
    }
}

/// Number of characters shown for `progress`
pub fn revealed_chars(text: &str, progress: f64) -> usize {
    let total = text.chars().count();
    ((total as f64) * progress.clamp(0.0, 1.0)).floor() as usize
}

/// Prefix of `text` holding the first `progress` fraction of its characters
pub fn typewriter_prefix(text: &str, progress: f64) -> &str {
    prefix_chars(text, revealed_chars(text, progress))
}

fn prefix_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Square-wave blink: visible during even `period_ms` slots
pub fn blink_on(now_ms: f64, period_ms: f64) -> bool {
    if period_ms <= 0.0 {
        return true;
    }
    (now_ms / period_ms).floor().rem_euclid(2.0) == 0.0
}

/// Title cursor: shown while typing and during the "on" half of the blink
pub fn title_cursor_visible(text: &str, progress: f64, now_ms: f64) -> bool {
    progress < 1.0
        && revealed_chars(text, progress) < text.chars().count()
        && blink_on(now_ms, consts::TITLE_CURSOR_BLINK_MS)
}

/// One body line as the typewriter currently shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedLine<'a> {
    pub text: &'a str,
    /// Line is still being typed
    pub typing: bool,
}

/// Reveal a multi-line body: characters are counted across lines (each line
/// break counts as one character) and lines not yet reached are omitted.
pub fn typewriter_lines(text: &str, progress: f64) -> Vec<TypedLine<'_>> {
    let revealed = revealed_chars(text, progress);
    let mut out = Vec::new();
    let mut consumed = 0usize;

    for line in text.split('\n') {
        if revealed <= consumed {
            break;
        }
        let len = line.chars().count();
        let shown = (revealed - consumed).min(len);
        out.push(TypedLine {
            text: prefix_chars(line, shown),
            typing: shown < len,
        });
        consumed += len + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_smoothed_target_regions() {
        let reveal = SmoothedProximityReveal::default();
        // On top of the photo
        assert_eq!(reveal.target(1000.0, 1000.0, 400.0), 1.0);
        // Far ahead stays hidden
        assert_eq!(reveal.target(0.0, 5000.0, 5400.0), 0.0);
        // Far behind stays shown
        assert_eq!(reveal.target(5000.0, 1000.0, 0.0), 1.0);
        // Half way, eased
        let t = reveal.target(600.0, 1000.0, 800.0);
        assert!((t - 0.5f64.powf(1.2)).abs() < 1e-12);
    }

    #[test]
    fn test_smoothed_fade_window() {
        let reveal = SmoothedProximityReveal::default();
        assert_eq!(reveal.target(9000.0, 1000.0, -1500.0), 1.0);
        assert!((reveal.target(9000.0, 1000.0, -2500.0) - 0.5).abs() < 1e-12);
        assert_eq!(reveal.target(9000.0, 1000.0, -4000.0), 0.0);
    }

    #[test]
    fn test_smoothed_step_approaches() {
        let reveal = SmoothedProximityReveal::default();
        let next = reveal.step(0.0, 1.0);
        assert!((next - 0.08).abs() < 1e-12);
        let mut current = 0.0;
        for _ in 0..200 {
            current = reveal.step(current, 1.0);
        }
        assert!(current > 0.99 && current <= 1.0);
    }

    #[test]
    fn test_instant_reveal() {
        let reveal = InstantProximityReveal::default();
        assert_eq!(reveal.progress(0.0, 600.0), 0.0);
        assert_eq!(reveal.progress(8600.0, 8600.0), 1.0);
        assert!(reveal.progress(8400.0, 8600.0) > 0.0);
        assert_eq!(reveal.progress(9300.0, 8600.0), 0.0);
    }

    #[test]
    fn test_typewriter_respects_char_boundaries() {
        let title = "Évasion vers l'Inde";
        assert_eq!(typewriter_prefix(title, 0.0), "");
        assert_eq!(typewriter_prefix(title, 1.0), title);
        let half = typewriter_prefix(title, 0.5);
        assert!(title.starts_with(half));
        assert_eq!(half.chars().count(), title.chars().count() / 2);
    }

    #[test]
    fn test_typewriter_lines() {
        let body = "abc\ndef";
        assert!(typewriter_lines(body, 0.0).is_empty());

        // 7 chars total, 0.5 → 3 chars: the whole first line
        let lines = typewriter_lines(body, 0.5);
        assert_eq!(lines, vec![TypedLine { text: "abc", typing: false }]);

        let lines = typewriter_lines(body, 0.75);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], TypedLine { text: "d", typing: true });

        let lines = typewriter_lines(body, 1.0);
        assert_eq!(lines[1], TypedLine { text: "def", typing: false });
    }

    #[test]
    fn test_cursor_blink() {
        assert!(blink_on(0.0, 400.0));
        assert!(!blink_on(400.0, 400.0));
        assert!(blink_on(800.0, 400.0));
        assert!(title_cursor_visible("hello", 0.5, 0.0));
        assert!(!title_cursor_visible("hello", 1.0, 0.0));
        assert!(!title_cursor_visible("hello", 0.5, 450.0));
    }

    proptest! {
        #[test]
        fn prop_smoothed_step_in_unit_range(current in 0.0f64..=1.0, target in 0.0f64..=1.0) {
            let reveal = SmoothedProximityReveal::default();
            let next = reveal.step(current, target);
            prop_assert!((0.0..=1.0).contains(&next));
            // Never overshoots the target
            prop_assert!((next - target).abs() <= (current - target).abs() + 1e-12);
        }
    }
}

//! 2D rendering module
//!
//! The frame painter talks to a `Surface`, a thin immediate-mode drawing
//! contract modelled on the Canvas 2D API. The browser backend forwards to
//! `CanvasRenderingContext2d`; `RecordingSurface` keeps a command list for
//! tests and the headless run.

pub mod frame;
pub mod record;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use frame::{FrameStyle, draw_frame};
pub use record::{DrawCmd, RecordedImage, RecordingSurface};

use crate::images::ImageHandle;

/// Color stop: offset in [0, 1] and a CSS color
pub type ColorStop = (f64, String);

/// Fill or stroke source
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Any CSS color string
    Color(String),
    Linear {
        from: (f64, f64),
        to: (f64, f64),
        stops: Vec<ColorStop>,
    },
    Radial {
        /// Inner circle (x, y, r)
        inner: (f64, f64, f64),
        /// Outer circle (x, y, r)
        outer: (f64, f64, f64),
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    pub fn color(css: impl Into<String>) -> Self {
        Paint::Color(css.into())
    }

    pub fn linear(from: (f64, f64), to: (f64, f64), stops: &[(f64, &str)]) -> Self {
        Paint::Linear {
            from,
            to,
            stops: owned_stops(stops),
        }
    }

    pub fn radial(inner: (f64, f64, f64), outer: (f64, f64, f64), stops: &[(f64, &str)]) -> Self {
        Paint::Radial {
            inner,
            outer,
            stops: owned_stops(stops),
        }
    }

    /// Radial glow from `(x, y)` out to `radius`
    pub fn glow(x: f64, y: f64, radius: f64, stops: &[(f64, &str)]) -> Self {
        Self::radial((x, y, 0.0), (x, y, radius), stops)
    }
}

fn owned_stops(stops: &[(f64, &str)]) -> Vec<ColorStop> {
    stops.iter().map(|&(o, c)| (o, c.to_string())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
}

impl LineCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

impl LineJoin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
        }
    }
}

/// Immediate-mode drawing target.
///
/// State setters persist until the next `restore`, exactly like a canvas
/// context. Drawing never fails: backends swallow their own errors.
pub trait Surface {
    type Image: ImageHandle;

    // === State ===
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_fill(&mut self, paint: &Paint);
    fn set_stroke(&mut self, paint: &Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Empty slice means solid
    fn set_line_dash(&mut self, segments: &[f64]);
    fn set_shadow(&mut self, color: &str, blur: f64, offset_x: f64, offset_y: f64);
    /// CSS filter string, `"none"` to clear
    fn set_filter(&mut self, filter: &str);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    // === Rectangles ===
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    // === Paths ===
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64);
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    /// Intersect the clip region with the current path
    fn clip(&mut self);

    // === Text and images ===
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    /// Width of `text` in the current font
    fn measure_text(&mut self, text: &str) -> f64;
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, w: f64, h: f64);

    // === Helpers ===
    fn clear_shadow(&mut self) {
        self.set_shadow("transparent", 0.0, 0.0, 0.0);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.begin_path();
        self.arc(x, y, radius, 0.0, std::f64::consts::TAU);
        self.fill();
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.begin_path();
        self.move_to(x1, y1);
        self.line_to(x2, y2);
        self.stroke();
    }

    /// Add a rounded rectangle to the current path
    fn round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        self.move_to(x + r, y);
        self.line_to(x + w - r, y);
        self.quadratic_curve_to(x + w, y, x + w, y + r);
        self.line_to(x + w, y + h - r);
        self.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        self.line_to(x + r, y + h);
        self.quadratic_curve_to(x, y + h, x, y + h - r);
        self.line_to(x, y + r);
        self.quadratic_curve_to(x, y, x + r, y);
        self.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_builders() {
        let p = Paint::glow(10.0, 20.0, 30.0, &[(0.0, "#fff"), (1.0, "transparent")]);
        match p {
            Paint::Radial { inner, outer, stops } => {
                assert_eq!(inner, (10.0, 20.0, 0.0));
                assert_eq!(outer, (10.0, 20.0, 30.0));
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[1].1, "transparent");
            }
            other => panic!("expected radial, got {other:?}"),
        }
        assert_eq!(Paint::color("red"), Paint::Color("red".into()));
    }

    #[test]
    fn test_round_rect_clamps_radius() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.begin_path();
        surface.round_rect(0.0, 0.0, 10.0, 4.0, 50.0);
        // Radius clamps to half the height: first move lands at x = 2
        assert!(surface.commands().contains(&DrawCmd::MoveTo(2.0, 0.0)));
    }

    #[test]
    fn test_keyword_strings() {
        assert_eq!(LineCap::Round.as_str(), "round");
        assert_eq!(LineJoin::Bevel.as_str(), "bevel");
        assert_eq!(TextAlign::Center.as_str(), "center");
        assert_eq!(TextBaseline::Middle.as_str(), "middle");
    }
}

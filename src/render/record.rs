//! Recording surface
//!
//! Stores every call as a `DrawCmd` instead of rasterizing. Used by tests
//! and by the native headless run to check what a frame would paint.

use super::{LineCap, LineJoin, Paint, Surface, TextAlign, TextBaseline};
use crate::images::ImageHandle;

/// Stand-in image for headless drawing
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedImage {
    pub url: String,
    pub ready: bool,
}

impl RecordedImage {
    pub fn loaded(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ready: true,
        }
    }
}

impl ImageHandle for RecordedImage {
    fn is_ready(&self) -> bool {
        self.ready
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    GlobalAlpha(f64),
    Fill(Paint),
    Stroke(Paint),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    LineDash(Vec<f64>),
    Shadow { color: String, blur: f64, offset: (f64, f64) },
    Filter(String),
    Font(String),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),
    Arc { x: f64, y: f64, radius: f64 },
    Rect(f64, f64, f64, f64),
    ClosePath,
    FillPath,
    StrokePath,
    Clip,
    Text { text: String, x: f64, y: f64 },
    Image { url: String, x: f64, y: f64, w: f64, h: f64 },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    commands: Vec<DrawCmd>,
    font_px: f64,
    depth: i32,
    min_depth: i32,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            font_px: 10.0,
            depth: 0,
            min_depth: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCmd> {
        self.depth = 0;
        self.min_depth = 0;
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every `save` had a matching `restore`, in order
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && self.min_depth >= 0
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// URLs of all images drawn so far
    pub fn images(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Image { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }
}

/// Pixel size from a CSS font shorthand such as `"bold 16px sans-serif"`
fn font_size_px(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px")?.parse::<f64>().ok())
}

impl Surface for RecordingSurface {
    type Image = RecordedImage;

    fn save(&mut self) {
        self.depth += 1;
        self.push(DrawCmd::Save);
    }

    fn restore(&mut self) {
        self.depth -= 1;
        self.min_depth = self.min_depth.min(self.depth);
        self.push(DrawCmd::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCmd::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.push(DrawCmd::Rotate(angle));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(DrawCmd::GlobalAlpha(alpha));
    }

    fn set_fill(&mut self, paint: &Paint) {
        self.push(DrawCmd::Fill(paint.clone()));
    }

    fn set_stroke(&mut self, paint: &Paint) {
        self.push(DrawCmd::Stroke(paint.clone()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCmd::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.push(DrawCmd::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.push(DrawCmd::LineJoin(join));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.push(DrawCmd::LineDash(segments.to_vec()));
    }

    fn set_shadow(&mut self, color: &str, blur: f64, offset_x: f64, offset_y: f64) {
        self.push(DrawCmd::Shadow {
            color: color.to_string(),
            blur,
            offset: (offset_x, offset_y),
        });
    }

    fn set_filter(&mut self, filter: &str) {
        self.push(DrawCmd::Filter(filter.to_string()));
    }

    fn set_font(&mut self, font: &str) {
        if let Some(px) = font_size_px(font) {
            self.font_px = px;
        }
        self.push(DrawCmd::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawCmd::TextAlign(align));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(DrawCmd::TextBaseline(baseline));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCmd::FillRect(x, y, w, h));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCmd::StrokeRect(x, y, w, h));
    }

    fn begin_path(&mut self) {
        self.push(DrawCmd::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCmd::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCmd::LineTo(x, y));
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.push(DrawCmd::QuadTo(cx, cy, x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start: f64, _end: f64) {
        self.push(DrawCmd::Arc { x, y, radius });
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCmd::Rect(x, y, w, h));
    }

    fn close_path(&mut self) {
        self.push(DrawCmd::ClosePath);
    }

    fn fill(&mut self) {
        self.push(DrawCmd::FillPath);
    }

    fn stroke(&mut self) {
        self.push(DrawCmd::StrokePath);
    }

    fn clip(&mut self) {
        self.push(DrawCmd::Clip);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push(DrawCmd::Text {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        // Rough average glyph advance
        text.chars().count() as f64 * self.font_px * 0.55
    }

    fn draw_image(&mut self, image: &RecordedImage, x: f64, y: f64, w: f64, h: f64) {
        self.push(DrawCmd::Image {
            url: image.url.clone(),
            x,
            y,
            w,
            h,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_parsing() {
        assert_eq!(font_size_px("bold 16px sans-serif"), Some(16.0));
        assert_eq!(font_size_px("italic 13.5px Georgia"), Some(13.5));
        assert_eq!(font_size_px("serif"), None);
    }

    #[test]
    fn test_measure_follows_font() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.set_font("20px serif");
        let wide = surface.measure_text("abcd");
        surface.set_font("10px serif");
        assert!((wide - 2.0 * surface.measure_text("abcd")).abs() < 1e-9);
    }

    #[test]
    fn test_balance_tracking() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.save();
        surface.fill_circle(1.0, 1.0, 1.0);
        surface.restore();
        assert!(surface.is_balanced());
        assert_eq!(surface.count(|c| matches!(c, DrawCmd::Arc { .. })), 1);

        surface.restore();
        surface.save();
        assert!(!surface.is_balanced());
        surface.take_commands();
        assert!(surface.is_balanced());
        assert!(surface.is_empty());
    }
}

//! Frame painter
//!
//! Paints one frame of the experience from an `Experience` snapshot. Pure
//! with respect to the simulation: it only reads state. Layers are drawn
//! back to front and every layer restores the surface state it changed.

use std::f64::consts::PI;

use super::{LineCap, LineJoin, Paint, Surface, TextAlign, TextBaseline};
use crate::consts::{
    GRID_SPACING, NAV_HEIGHT, PHOTO_TEXT_OFFSET, POLAROID_BOTTOM_PADDING, POLAROID_PADDING,
};
use crate::images::ImageCache;
use crate::layers::VisualFilter;
use crate::settings::Settings;
use crate::sim::reveal::{
    blink_on, title_cursor_visible, typewriter_lines, typewriter_prefix,
};
use crate::sim::{BackgroundPhoto, CollectibleKind, Experience, PhotoSide, Rgb, ZoneKind};

const BG_START: Rgb = Rgb::new(10, 12, 20);
const BG_END: Rgb = Rgb::new(60, 65, 75);
const CURSOR: &str = "│";
macro_rules! system_font {
    ($weight:literal, $px:literal) => {
        concat!(
            $weight,
            " ",
            $px,
            "px -apple-system, BlinkMacSystemFont, \"Segoe UI\", Inter, sans-serif"
        )
    };
}

const TITLE_FONT: &str = system_font!("700", "24");
const BODY_FONT: &str = system_font!("400", "17");
const QUOTE_FONT: &str = system_font!("700", "26");

/// Stick figure height
const FIGURE_SIZE: f64 = 45.0;
const COLLECTIBLE_GLOW: f64 = 30.0;
const PROGRESS_BAR: (f64, f64, f64, f64) = (30.0, 30.0, 300.0, 8.0);
const LEVEL_BAR_GAP: f64 = 4.0;
const LEVEL_BAR_HEIGHT: f64 = 2.0;

/// Which optional layers to paint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStyle {
    pub trails: bool,
    pub show_hud: bool,
    pub twinkle: bool,
    pub zone_sparkles: usize,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for FrameStyle {
    fn from(settings: &Settings) -> Self {
        Self {
            trails: settings.trails,
            show_hud: settings.show_hud,
            twinkle: settings.effective_twinkle(),
            zone_sparkles: settings.quality.zone_sparkles(),
        }
    }
}

/// Per-frame values shared by every layer
struct FrameCtx<'a> {
    exp: &'a Experience,
    width: f64,
    height: f64,
    center_y: f64,
    progress: f64,
    accent: Rgb,
    accent_css: String,
    now: f64,
}

impl FrameCtx<'_> {
    fn early(&self) -> bool {
        self.progress < 0.5
    }

    fn screen_x(&self, world_x: f64) -> f64 {
        self.exp.world_to_screen_x(world_x)
    }
}

/// Paint the whole frame. A zero-sized viewport paints nothing.
pub fn draw_frame<S: Surface>(
    surface: &mut S,
    exp: &Experience,
    images: &ImageCache<S::Image>,
    style: &FrameStyle,
) {
    let (width, height) = (exp.viewport.x, exp.viewport.y);
    if width <= 0.0 || height <= 0.0 {
        return;
    }

    let accent = exp.current_level().color;
    let ctx = FrameCtx {
        exp,
        width,
        height,
        center_y: height / 2.0,
        progress: exp.global_progress(),
        accent,
        accent_css: accent.to_hex(),
        now: exp.now_ms,
    };

    draw_background(surface, &ctx);
    draw_horizon_and_grid(surface, &ctx);
    draw_nav_bar(surface, &ctx);
    draw_layer_photos(surface, &ctx, images);
    for photo in &exp.photos {
        draw_polaroid(surface, &ctx, photo, images);
    }
    if style.trails {
        draw_trail(surface, &ctx);
    }
    draw_figure(surface, &ctx);
    draw_collectibles(surface, &ctx);
    draw_zones(surface, &ctx, style.zone_sparkles);
    draw_effects(surface, &ctx);
    if style.show_hud {
        draw_hud(surface, &ctx);
    }
    draw_particles(surface, &ctx, style.twinkle);
    draw_quotes(surface, &ctx);
}

fn lerp_rgb(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb::new(channel(from.r, to.r), channel(from.g, to.g), channel(from.b, to.b))
}

/// Background color for a story progress in [0, 1]
pub fn background_color(progress: f64) -> Rgb {
    lerp_rgb(BG_START, BG_END, progress)
}

fn draw_background<S: Surface>(s: &mut S, c: &FrameCtx) {
    let bg = background_color(c.progress);
    s.set_fill(&Paint::color(format!("rgb({}, {}, {})", bg.r, bg.g, bg.b)));
    s.fill_rect(0.0, 0.0, c.width, c.height);

    let cx = c.width / 2.0;
    let reach = c.width.max(c.height);

    // Vignette, gone by 70%
    if c.progress < 0.7 {
        let strength = (1.0 - c.progress / 0.7) * 0.6;
        let edge = format!("rgba(0, 0, 0, {strength})");
        s.set_fill(&Paint::glow(
            cx,
            c.center_y,
            reach * 0.6,
            &[(0.0, "rgba(0, 0, 0, 0)"), (1.0, edge.as_str())],
        ));
        s.fill_rect(0.0, 0.0, c.width, c.height);
    }

    // Warm light from 30%
    if c.progress > 0.3 {
        let strength = (c.progress - 0.3) / 0.7;
        let core = format!("rgba(255, 240, 120, {})", strength * 0.25);
        let mid = format!("rgba(255, 220, 80, {})", strength * 0.15);
        s.set_fill(&Paint::glow(
            cx,
            c.center_y,
            reach * 0.5,
            &[(0.0, core.as_str()), (0.5, mid.as_str()), (1.0, "rgba(255, 200, 60, 0)")],
        ));
        s.fill_rect(0.0, 0.0, c.width, c.height);
    }

    // Rays from 60%
    if c.progress > 0.6 {
        let strength = (c.progress - 0.6) / 0.4;
        s.save();
        s.set_global_alpha(strength * 0.1);
        s.translate(cx, c.center_y);
        let ray = Paint::linear(
            (0.0, 0.0),
            (0.0, c.height / 2.0),
            &[(0.0, "rgba(255, 230, 100, 0.3)"), (1.0, "rgba(255, 230, 100, 0)")],
        );
        for _ in 0..12 {
            s.rotate(PI / 6.0);
            s.set_fill(&ray);
            s.fill_rect(-20.0, 0.0, 40.0, c.height / 2.0);
        }
        s.restore();
    }
}

fn draw_horizon_and_grid<S: Surface>(s: &mut S, c: &FrameCtx) {
    let accent = Paint::color(c.accent_css.clone());

    s.save();
    s.set_global_alpha(0.12);
    s.set_stroke(&accent);
    s.set_line_width(1.0);
    s.set_line_dash(&[15.0, 30.0]);
    s.line(0.0, c.center_y, c.width, c.center_y);
    s.set_line_dash(&[]);
    s.restore();

    s.save();
    s.set_global_alpha(0.03 + c.progress * 0.05);
    s.set_stroke(&accent);
    s.set_line_width(0.5);
    let offset = (c.exp.world_x * 0.3).rem_euclid(GRID_SPACING);
    let mut x = -offset;
    while x < c.width {
        s.line(x, 0.0, x, c.height);
        x += GRID_SPACING;
    }
    s.restore();
}

fn draw_nav_bar<S: Surface>(s: &mut S, c: &FrameCtx) {
    s.save();
    s.set_fill(&Paint::color(if c.early() {
        "rgba(0, 0, 0, 0.3)"
    } else {
        "rgba(255, 255, 255, 0.08)"
    }));
    s.fill_rect(0.0, 0.0, c.width, NAV_HEIGHT);

    s.set_stroke(&Paint::color(c.accent_css.clone()));
    s.set_line_width(1.0);
    s.set_global_alpha(0.2);
    s.line(0.0, NAV_HEIGHT, c.width, NAV_HEIGHT);
    s.restore();
}

fn draw_layer_photos<S: Surface>(s: &mut S, c: &FrameCtx, images: &ImageCache<S::Image>) {
    let levels = c.exp.levels.levels();
    for photo in c.exp.layers.photos() {
        if photo.opacity() <= 0.0 {
            continue;
        }
        let x = c.screen_x(photo.x) + photo.offset_x();
        if x + photo.width < 0.0 || x > c.width {
            continue;
        }
        let Some(image) = images.ready(&photo.src) else {
            continue;
        };

        let filter = levels
            .iter()
            .find(|l| l.id == photo.level_id)
            .map(|l| VisualFilter::from(&l.visual));
        let (dx, dy) = filter.map_or((0.0, 0.0), |f| f.drift_offset(c.now));
        let (x, y) = (x + dx, photo.y + dy);

        s.save();
        s.set_global_alpha(photo.opacity());
        if let Some(filter) = &filter {
            s.set_filter(&filter.to_filter_string());
        }
        s.draw_image(image, x, y, photo.width, photo.height);
        s.set_filter("none");

        if let Some(filter) = filter.filter(|f| f.vignette > 0.0) {
            let edge = format!("rgba(0, 0, 0, {})", filter.vignette);
            let radius = photo.width.max(photo.height) * 0.7;
            s.set_fill(&Paint::glow(
                x + photo.width / 2.0,
                y + photo.height / 2.0,
                radius,
                &[(0.0, "rgba(0, 0, 0, 0)"), (0.5, "rgba(0, 0, 0, 0)"), (1.0, edge.as_str())],
            ));
            s.fill_rect(x, y, photo.width, photo.height);
        }
        s.restore();
    }
}

fn draw_polaroid<S: Surface>(
    s: &mut S,
    c: &FrameCtx,
    photo: &BackgroundPhoto,
    images: &ImageCache<S::Image>,
) {
    let photo_x = c.screen_x(photo.pos.x);
    if photo_x < -photo.size.x - 5000.0 || photo_x > c.width + 5000.0 {
        return;
    }

    let frame = photo.polaroid_size();
    let (pw, ph) = (frame.x, frame.y);
    let (iw, ih) = (photo.size.x, photo.size.y);
    let image_top = -ih / 2.0 - POLAROID_BOTTOM_PADDING / 2.0 + POLAROID_PADDING / 2.0;
    let reveal = photo.reveal_progress;
    let float = (c.now * 0.001 + photo.phase).sin() * 8.0;
    let tilt = match photo.side {
        PhotoSide::Left => -0.03,
        PhotoSide::Right => 0.03,
    };
    let drop_shadow = if c.early() { "rgba(0, 0, 0, 0.8)" } else { "rgba(0, 0, 0, 0.3)" };

    s.save();
    s.translate(photo_x, photo.pos.y + float);
    s.rotate(tilt + reveal * 0.02);

    // White frame with a deep drop shadow
    let shadow_x = if photo.side == PhotoSide::Left { -8.0 } else { 8.0 };
    s.set_shadow(drop_shadow, 60.0, shadow_x, 20.0);
    s.set_fill(&Paint::color("#FFFFFF"));
    s.fill_rect(-pw / 2.0, -ph / 2.0, pw, ph);
    s.clear_shadow();

    s.set_stroke(&Paint::linear(
        (-pw / 2.0, -ph / 2.0),
        (pw / 2.0, ph / 2.0),
        &[
            (0.0, c.accent_css.as_str()),
            (0.5, "rgba(255, 255, 255, 0.2)"),
            (1.0, c.accent_css.as_str()),
        ],
    ));
    s.set_line_width(3.0);
    s.stroke_rect(-pw / 2.0, -ph / 2.0, pw, ph);

    // Accent glow grows with the reveal
    s.save();
    s.set_global_alpha(reveal * 0.4);
    s.set_shadow(&c.accent_css, 40.0, 0.0, 0.0);
    s.set_stroke(&Paint::color(c.accent_css.clone()));
    s.set_line_width(1.0);
    s.stroke_rect(-pw / 2.0, -ph / 2.0, pw, ph);
    s.restore();

    if let Some(image) = images.ready(&photo.image_url) {
        s.save();
        s.begin_path();
        s.rect(-iw / 2.0, image_top, iw, ih);
        s.clip();
        if c.progress < 0.3 {
            let gray = (1.0 - c.progress / 0.3) * 0.7;
            s.set_filter(&format!("grayscale({gray}) sepia(0.3)"));
        }
        s.draw_image(image, -iw / 2.0, image_top, iw, ih);
        s.set_filter("none");
        s.restore();

        s.save();
        s.set_global_alpha(0.15);
        s.set_fill(&Paint::linear(
            (-iw / 2.0, -ih / 2.0),
            (iw / 2.0, ih / 2.0),
            &[
                (0.0, "rgba(255, 255, 255, 0.8)"),
                (0.5, "rgba(255, 255, 255, 0)"),
                (1.0, "rgba(255, 255, 255, 0.3)"),
            ],
        ));
        s.fill_rect(-iw / 2.0, image_top, iw, ih);
        s.restore();
    }

    // Caption
    s.save();
    s.set_fill(&Paint::color(if c.early() { "#1a1a1a" } else { "#2d2d2d" }));
    s.set_font("italic 14px Georgia, serif");
    s.set_text_align(TextAlign::Center);
    s.set_text_baseline(TextBaseline::Middle);
    s.fill_text(&format!("Phase {}/12", photo.phase as u32), 0.0, image_top + 12.0);
    s.restore();

    if photo.side == PhotoSide::Right {
        draw_folded_corner(s, pw, ph);
    }
    s.restore();

    draw_photo_text(s, c, photo, photo_x + pw / 2.0 + PHOTO_TEXT_OFFSET);
}

fn draw_folded_corner<S: Surface>(s: &mut S, pw: f64, ph: f64) {
    let (right, top) = (pw / 2.0, -ph / 2.0);
    s.save();
    s.set_fill(&Paint::color("rgba(0, 0, 0, 0.15)"));
    s.begin_path();
    s.move_to(right - 20.0, top);
    s.line_to(right, top);
    s.line_to(right, top + 20.0);
    s.close_path();
    s.fill();

    s.set_fill(&Paint::color("rgba(255, 255, 255, 0.9)"));
    s.begin_path();
    s.move_to(right - 20.0, top);
    s.line_to(right, top + 20.0);
    s.line_to(right - 15.0, top + 5.0);
    s.close_path();
    s.fill();
    s.restore();
}

/// Typewriter title, underline and body to the right of a polaroid
fn draw_photo_text<S: Surface>(s: &mut S, c: &FrameCtx, photo: &BackgroundPhoto, text_x: f64) {
    let reveal = photo.reveal_progress;
    let title_y = c.center_y - 15.0;

    s.save();
    s.set_text_align(TextAlign::Left);
    s.set_text_baseline(TextBaseline::Middle);

    let shown = typewriter_prefix(&photo.title, reveal);
    let mut title = shown.to_string();
    if title_cursor_visible(&photo.title, reveal, c.now) {
        title.push_str(CURSOR);
    }

    // Neon title, drawn twice for a stronger glow
    s.save();
    s.set_shadow(&c.accent_css, 20.0, 0.0, 0.0);
    s.set_fill(&Paint::color(c.accent_css.clone()));
    s.set_font(TITLE_FONT);
    s.fill_text(&title, text_x, title_y);
    s.set_global_alpha(0.6);
    s.set_shadow(&c.accent_css, 40.0, 0.0, 0.0);
    s.fill_text(&title, text_x, title_y);
    let underline = s.measure_text(shown) * reveal;
    s.restore();

    s.save();
    s.set_stroke(&Paint::color(c.accent_css.clone()));
    s.set_line_width(2.0);
    s.set_global_alpha(0.5);
    s.line(text_x, c.center_y - 3.0, text_x + underline, c.center_y - 3.0);
    s.restore();

    s.set_fill(&Paint::color(if c.early() { "#F0F0F0" } else { "#E8E8E8" }));
    s.set_global_alpha(0.85);
    s.set_font(BODY_FONT);
    let shadow = if c.early() { "rgba(0, 0, 0, 0.8)" } else { "rgba(0, 0, 0, 0.3)" };
    s.set_shadow(shadow, 8.0, 0.0, 0.0);

    for (index, line) in typewriter_lines(&photo.text, reveal).iter().enumerate() {
        let y = c.center_y + 18.0 + index as f64 * 28.0;
        s.fill_text(line.text, text_x, y);
        if line.typing && blink_on(c.now, crate::consts::BODY_CURSOR_BLINK_MS) {
            let cursor_x = text_x + s.measure_text(line.text) + 3.0;
            s.fill_text(CURSOR, cursor_x, y);
        }
    }
    s.restore();
}

fn draw_trail<S: Surface>(s: &mut S, c: &FrameCtx) {
    let trail = &c.exp.player.trail;
    if trail.len() < 2 {
        return;
    }

    s.save();
    s.set_stroke(&Paint::color(c.accent_css.clone()));
    s.set_line_width(6.0);
    s.set_line_cap(LineCap::Round);
    s.set_line_join(LineJoin::Round);
    s.set_shadow(&c.accent_css, 25.0, 0.0, 0.0);

    // One segment per step so alpha can ramp up toward the head
    let len = trail.len() as f64;
    for (i, (a, b)) in trail.iter().zip(trail.iter().skip(1)).enumerate() {
        s.set_global_alpha((i + 1) as f64 / len * 0.6);
        s.line(a.x, a.y, b.x, b.y);
    }
    s.restore();
}

fn draw_figure<S: Surface>(s: &mut S, c: &FrameCtx) {
    let pos = c.exp.player.pos;
    let (x, y) = (pos.x, pos.y);
    let size = FIGURE_SIZE;
    let head_r = size / 3.0;
    let head_y = y - size / 3.0;
    let body = size / 2.0;

    s.save();
    s.set_shadow(&c.accent_css, 40.0, 0.0, 0.0);

    let halo = c.accent.to_css_alpha(0.3);
    s.set_fill(&Paint::glow(
        x,
        y,
        size * 1.5,
        &[(0.0, halo.as_str()), (1.0, "rgba(255, 255, 255, 0)")],
    ));
    s.fill_circle(x, y, size * 1.5);

    s.set_fill(&Paint::radial(
        (x - 3.0, head_y - 3.0, 2.0),
        (x, head_y, head_r),
        &[(0.0, "#FFFFFF"), (1.0, "#E0E0E0")],
    ));
    s.fill_circle(x, head_y, head_r);

    s.set_stroke(&Paint::color("#FFFFFF"));
    s.set_line_cap(LineCap::Round);
    s.set_line_width(5.0);
    s.line(x, head_y + head_r, x, y + body);

    let walk = (c.now * 0.01).sin() * 0.5;
    let swing = walk.sin();
    let stride = (walk + PI).sin();

    s.set_line_width(4.0);
    s.line(x, y, x - size / 3.0, y + size / 3.0 + swing * 10.0);
    s.line(x, y, x + size / 3.0, y + size / 3.0 - swing * 10.0);
    s.line(x, y + body, x - size / 4.0, y + size + stride * 12.0);
    s.line(x, y + body, x + size / 4.0, y + size - stride * 12.0);
    s.restore();
}

fn collectible_color(kind: CollectibleKind) -> &'static str {
    match kind {
        CollectibleKind::Star => "#FFC700",
        CollectibleKind::Heart => "#FF6B9D",
        CollectibleKind::Memory => "#4ECDC4",
    }
}

fn draw_collectibles<S: Surface>(s: &mut S, c: &FrameCtx) {
    let glow = COLLECTIBLE_GLOW + (c.now * 0.005).sin() * 8.0;

    for item in c.exp.collectibles.iter().filter(|item| !item.collected) {
        let x = c.screen_x(item.pos.x);
        if !(-100.0..=c.width + 100.0).contains(&x) {
            continue;
        }
        let y = item.world_pos().y;
        let color = collectible_color(item.kind);
        let fill = Paint::color(color);

        s.save();
        s.set_shadow(color, 30.0, 0.0, 0.0);
        s.set_global_alpha(0.4);
        s.set_fill(&fill);
        s.fill_circle(x, y, glow);
        s.set_global_alpha(1.0);
        s.set_shadow(color, 15.0, 0.0, 0.0);

        match item.kind {
            CollectibleKind::Star => {
                s.begin_path();
                for i in 0..5 {
                    let angle = (i as f64 * 4.0 * PI) / 5.0 - PI / 2.0;
                    let (px, py) = (x + angle.cos() * 12.0, y + angle.sin() * 12.0);
                    if i == 0 {
                        s.move_to(px, py);
                    } else {
                        s.line_to(px, py);
                    }
                }
                s.close_path();
                s.fill();
            }
            CollectibleKind::Heart => s.fill_circle(x, y, 10.0),
            CollectibleKind::Memory => s.fill_rect(x - 10.0, y - 10.0, 20.0, 20.0),
        }
        s.restore();
    }
}

pub fn zone_color(kind: ZoneKind) -> &'static str {
    match kind {
        ZoneKind::Wind => "#6DD5FA",
        ZoneKind::Gravity => "#A78BFA",
        ZoneKind::Bounce => "#FFC700",
        ZoneKind::Slow => "#FF6B9D",
    }
}

/// Stateless hash to [0, 1) for decorative placement
fn hash01(a: u64, b: u64, c: u64) -> f64 {
    let mut z = a
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(b.wrapping_mul(0xBF58_476D_1CE4_E5B9))
        .wrapping_add(c.wrapping_mul(0x94D0_49BB_1331_11EB));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

fn draw_zones<S: Surface>(s: &mut S, c: &FrameCtx, sparkles: usize) {
    for (index, zone) in c.exp.zones.iter().enumerate() {
        let x = c.screen_x(zone.center.x);
        let (w, h) = (zone.size.x, zone.size.y);
        if x < -w - 100.0 || x > c.width + 100.0 {
            continue;
        }
        let y = zone.center.y;
        let color = zone_color(zone.kind);

        s.save();
        s.set_global_alpha(if zone.active { 0.3 } else { 0.15 });
        s.set_fill(&Paint::glow(x, y, w / 2.0, &[(0.0, color), (1.0, "rgba(0, 0, 0, 0)")]));
        s.fill_rect(x - w / 2.0, y - h / 2.0, w, h);

        if zone.active {
            s.set_fill(&Paint::color(color));
            for i in 0..sparkles as u64 {
                let seed = (c.exp.frame, index as u64);
                let px = x + (hash01(seed.0, seed.1, i * 3) - 0.5) * w;
                let py = y + (hash01(seed.0, seed.1, i * 3 + 1) - 0.5) * h;
                s.set_global_alpha(hash01(seed.0, seed.1, i * 3 + 2) * 0.5);
                s.fill_circle(px, py, 3.0);
            }
        }
        s.restore();
    }
}

fn draw_effects<S: Surface>(s: &mut S, c: &FrameCtx) {
    if c.exp.effects.is_empty() {
        return;
    }
    s.save();
    for effect in &c.exp.effects {
        let age = effect.age();
        s.set_global_alpha(1.0 - age);
        for p in &effect.particles {
            let radius = (p.size * (1.0 - age * 0.5)).max(crate::consts::EFFECT_MIN_RADIUS);
            s.set_fill(&Paint::color(p.color.to_hex()));
            s.fill_circle(c.screen_x(p.pos.x), p.pos.y, radius);
        }
    }
    s.restore();
}

fn draw_hud<S: Surface>(s: &mut S, c: &FrameCtx) {
    let accent = Paint::color(c.accent_css.clone());

    if c.exp.score > 0 {
        s.save();
        s.set_fill(&accent);
        s.set_font("bold 20px \"Arial Black\"");
        s.set_text_align(TextAlign::Right);
        s.set_shadow(&c.accent_css, 15.0, 0.0, 0.0);
        s.fill_text(&format!("{} pts", c.exp.score), c.width - 30.0, 35.0);
        s.restore();
    }

    let (bx, by, bw, bh) = PROGRESS_BAR;
    let filled = bw * c.progress;

    s.save();
    s.set_fill(&Paint::color("rgba(0, 0, 0, 0.5)"));
    s.fill_rect(bx, by, bw, bh);

    let faded = c.accent.to_css_alpha(0.6);
    let stops: [(f64, &str); 2] = if c.early() {
        [(0.0, "rgba(255, 200, 120, 0.8)"), (1.0, "rgba(255, 220, 150, 1)")]
    } else {
        [(0.0, c.accent_css.as_str()), (1.0, faded.as_str())]
    };
    s.set_fill(&Paint::linear((bx, by), (bx + filled, by), &stops));
    s.fill_rect(bx, by, filled, bh);

    // Thin bar under the main one: progress through the current level
    let level = c.exp.levels.level_progress(c.exp.world_x);
    s.set_fill(&Paint::color(faded.clone()));
    s.fill_rect(bx, by + bh + LEVEL_BAR_GAP, bw * level, LEVEL_BAR_HEIGHT);

    s.set_stroke(&accent);
    s.set_line_width(2.0);
    s.set_global_alpha(0.6);
    s.stroke_rect(bx, by, bw, bh);

    s.set_fill(&Paint::color("#FFF"));
    s.set_font("bold 14px Arial");
    s.set_text_align(TextAlign::Left);
    s.set_shadow("#000", 10.0, 0.0, 0.0);
    s.set_global_alpha(1.0);
    s.fill_text(&format!("{}%", (c.progress * 100.0).floor() as u32), bx, by - 8.0);

    s.set_font("italic 12px Georgia");
    s.set_fill(&accent);
    s.fill_text(&c.exp.current_level().name, bx + bw + 15.0, by + 6.0);
    s.restore();
}

fn draw_particles<S: Surface>(s: &mut S, c: &FrameCtx, twinkle: bool) {
    let starry = c.progress > 0.5 && twinkle;
    let dust = Paint::color("rgba(255, 240, 220, 0.5)");
    let star = Paint::color(c.accent_css.clone());
    let span = c.width + 20.0;

    for p in &c.exp.particles {
        let depth = p.size / 4.0;
        let x = (p.pos.x - c.exp.world_x * 0.1 * depth + 10.0).rem_euclid(span) - 10.0;

        s.save();
        s.set_global_alpha(p.opacity * 0.6);
        if starry {
            let glint = (c.now * 0.005 + p.pos.x).sin() * 0.5 + 0.5;
            s.set_shadow(&c.accent_css, p.size * 3.0 * glint, 0.0, 0.0);
            s.set_fill(&star);
        } else {
            s.set_fill(&dust);
        }
        s.fill_circle(x, p.pos.y, p.size * 0.8);
        s.restore();
    }
}

fn draw_quotes<S: Surface>(s: &mut S, c: &FrameCtx) {
    let late = c.progress > 0.7;
    let color = if late { "#1A1A1A".to_string() } else { c.accent_css.clone() };
    let glow = if late { "rgba(0, 0, 0, 0.3)".to_string() } else { c.accent_css.clone() };

    for quote in &c.exp.quotes {
        let x = c.screen_x(quote.pos.x);
        if x < -400.0 || x > c.width + 400.0 || quote.reveal_progress <= 0.0 {
            continue;
        }

        let mut text = typewriter_prefix(&quote.text, quote.reveal_progress).to_string();
        if title_cursor_visible(&quote.text, quote.reveal_progress, c.now) {
            text.push_str(CURSOR);
        }

        s.save();
        s.set_text_align(TextAlign::Center);
        s.set_text_baseline(TextBaseline::Middle);
        s.set_shadow(&glow, 20.0, 0.0, 0.0);
        s.set_fill(&Paint::color(color.clone()));
        s.set_font(QUOTE_FONT);
        s.fill_text(&text, x, quote.pos.y);
        s.set_global_alpha(0.6);
        s.set_shadow(&glow, 40.0, 0.0, 0.0);
        s.fill_text(&text, x, quote.pos.y);
        s.restore();
    }
}

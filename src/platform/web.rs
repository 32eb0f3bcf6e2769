//! Browser host
//!
//! Owns the canvas, the DOM listeners and the requestAnimationFrame loop.
//! Listeners only write into the input buffer; the frame callback commits
//! it, runs fixed-step ticks and paints.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, EventTarget, HtmlCanvasElement,
    HtmlImageElement, MouseEvent, Window,
};

use crate::audio::AudioBus;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::images::ImageCache;
use crate::input::InputBuffer;
use crate::platform::visit_seed;
use crate::render::canvas::CanvasSurface;
use crate::render::{FrameStyle, draw_frame};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{Experience, ScrollMapper, ScrollMetrics, tick};

type FrameCallback = Closure<dyn FnMut(f64)>;

/// A DOM listener kept alive until teardown
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Everything the frame loop mutates
struct App {
    exp: Experience,
    input: InputBuffer,
    mapper: ScrollMapper,
    images: ImageCache<HtmlImageElement>,
    audio: AudioBus,
    settings: Settings,
    style: FrameStyle,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    accumulator: f64,
    last_time: f64,
}

impl App {
    fn frame(&mut self, now: f64) {
        let dt = if self.last_time > 0.0 {
            ((now - self.last_time) / 1000.0).min(0.1)
        } else {
            SIM_DT
        };
        self.last_time = now;
        self.accumulator += dt;

        let input = self.input.commit(now);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.exp, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop backlog the substep cap could not absorb
        self.accumulator = self.accumulator.min(SIM_DT);

        for event in self.exp.drain_events() {
            self.audio.handle_event(&event);
        }

        draw_frame(&mut self.surface, &self.exp, &self.images, &self.style);
    }

    fn resize(&mut self, window: &Window) {
        let width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
            .max(0.0);
        let height = self.settings.canvas_height;
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.input.resize(width, height);
        log::debug!("Canvas resized to {width}x{height}");
    }

    fn scroll(&mut self, window: &Window) {
        let Some(root) = window.document().and_then(|d| d.document_element()) else {
            return;
        };
        let metrics = ScrollMetrics {
            scroll_top: window.scroll_y().unwrap_or(0.0),
            scroll_height: root.scroll_height() as f64,
            viewport_height: window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0),
        };
        let world_x = self.mapper.map(&metrics);
        self.input.set_world_x(world_x);
    }

    /// Start loading every photograph the world references
    fn request_images(&mut self, alive: &Rc<Cell<bool>>) {
        let urls: Vec<String> = self
            .exp
            .photos
            .iter()
            .map(|p| p.image_url.clone())
            .chain(self.exp.layers.photos().iter().map(|p| p.src.clone()))
            .collect();

        for url in urls {
            let alive = alive.clone();
            self.images.request(&url, |url| load_image(url, alive));
        }
        log::info!("Requested {} images", self.images.len());
    }
}

fn load_image(url: &str, alive: Rc<Cell<bool>>) -> Option<HtmlImageElement> {
    let image = HtmlImageElement::new().ok()?;
    image.set_cross_origin(Some("anonymous"));

    let failed = url.to_string();
    let on_error = Closure::<dyn FnMut()>::new(move || {
        if alive.get() {
            log::warn!("Image failed to load: {failed}");
        }
    });
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    // One per image, lives as long as the page
    on_error.forget();

    image.set_src(url);
    Some(image)
}

/// Handle returned to JavaScript; `stop` tears the experience down
#[wasm_bindgen]
pub struct ExperienceHandle {
    app: Rc<RefCell<App>>,
    alive: Rc<Cell<bool>>,
    frame_id: Rc<Cell<Option<i32>>>,
    frame_callback: Rc<RefCell<Option<FrameCallback>>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl ExperienceHandle {
    /// Cancel the pending frame, detach listeners and silence audio
    pub fn stop(&mut self) {
        if !self.alive.replace(false) {
            return;
        }
        if let (Some(window), Some(id)) = (web_sys::window(), self.frame_id.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        // Breaks the callback's reference to itself
        self.frame_callback.borrow_mut().take();
        self.app.borrow_mut().audio.stop_all();
        log::info!("Experience stopped");
    }

    pub fn is_running(&self) -> bool {
        self.alive.get()
    }

    pub fn score(&self) -> u64 {
        self.app.borrow().exp.score
    }

    pub fn world_x(&self) -> f64 {
        self.app.borrow().exp.world_x
    }

    /// Unlock audio; call from a user gesture
    pub fn enable_audio(&self) {
        self.app.borrow_mut().audio.init();
    }

    /// Hold the line at world `x` until released
    pub fn block_at(&self, x: f64) {
        self.app.borrow_mut().mapper.ceiling_mut().block_at(x);
    }

    pub fn advance_gate(&self, x: f64) {
        self.app.borrow_mut().mapper.ceiling_mut().advance_gate(x);
    }

    pub fn release_gate(&self) {
        self.app.borrow_mut().mapper.ceiling_mut().release();
    }

    /// Switch the quality preset and persist it
    pub fn set_quality(&self, preset: &str) {
        let Some(quality) = QualityPreset::parse(preset) else {
            log::warn!("Unknown quality preset {preset:?}");
            return;
        };
        let mut app = self.app.borrow_mut();
        app.settings.quality = quality;
        app.style = FrameStyle::from(&app.settings);
        app.settings.save();
    }
}

/// Mount the experience on the canvas with id `canvas_id` and start it
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> Result<ExperienceHandle, JsValue> {
    console_error_panic_hook::set_once();
    // Already initialized when started twice
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("unexpected context type"))?;

    let settings = Settings::load();
    let seed = visit_seed(settings.seed);
    let exp = Experience::new(seed).with_ambient_particles(settings.quality.ambient_particles());
    let total_width = exp.levels.total_width();
    log::info!("Lifelines starting (seed {seed}, quality {})", settings.quality.as_str());

    let alive = Rc::new(Cell::new(true));
    let app = Rc::new(RefCell::new(App {
        exp,
        input: InputBuffer::new(),
        mapper: ScrollMapper::new(total_width),
        images: ImageCache::new(),
        audio: AudioBus::new(settings.effective_volume()),
        style: FrameStyle::from(&settings),
        settings,
        surface: CanvasSurface::new(ctx),
        canvas: canvas.clone(),
        accumulator: 0.0,
        last_time: 0.0,
    }));

    {
        let mut a = app.borrow_mut();
        a.resize(&window);
        a.scroll(&window);
        a.request_images(&alive);
    }

    let listeners = attach_listeners(&window, &canvas, &app)?;

    let frame_id = Rc::new(Cell::new(None));
    let frame_callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    {
        let app = app.clone();
        let alive = alive.clone();
        let frame_id = frame_id.clone();
        let next = frame_callback.clone();
        *frame_callback.borrow_mut() = Some(Closure::new(move |now: f64| {
            if !alive.get() {
                return;
            }
            app.borrow_mut().frame(now);
            if let (Some(window), Some(callback)) = (web_sys::window(), next.borrow().as_ref()) {
                frame_id.set(
                    window
                        .request_animation_frame(callback.as_ref().unchecked_ref())
                        .ok(),
                );
            }
        }));
    }
    if let Some(callback) = frame_callback.borrow().as_ref() {
        frame_id.set(Some(
            window.request_animation_frame(callback.as_ref().unchecked_ref())?,
        ));
    }

    log::info!("Lifelines running");
    Ok(ExperienceHandle {
        app,
        alive,
        frame_id,
        frame_callback,
        listeners,
    })
}

fn attach_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    app: &Rc<RefCell<App>>,
) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();

    {
        let app = app.clone();
        let win = window.clone();
        listeners.push(Listener::attach(window, "scroll", true, move |_| {
            app.borrow_mut().scroll(&win);
        })?);
    }
    {
        let app = app.clone();
        let win = window.clone();
        listeners.push(Listener::attach(window, "resize", true, move |_| {
            let mut a = app.borrow_mut();
            a.resize(&win);
            a.scroll(&win);
        })?);
    }
    {
        let app = app.clone();
        listeners.push(Listener::attach(canvas, "mousemove", true, move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                app.borrow_mut()
                    .input
                    .pointer_moved(event.offset_x() as f64, event.offset_y() as f64);
            }
        })?);
    }
    {
        let app = app.clone();
        listeners.push(Listener::attach(canvas, "mouseleave", true, move |_| {
            app.borrow_mut().input.pointer_left();
        })?);
    }
    {
        // Browsers only allow audio after a gesture
        let app = app.clone();
        listeners.push(Listener::attach(window, "pointerdown", true, move |_| {
            app.borrow_mut().audio.init();
        })?);
    }

    Ok(listeners)
}

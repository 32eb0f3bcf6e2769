//! Lifelines entry point
//!
//! On the web the page calls `start` from the library; the binary only
//! mounts it on `#canvas`. Natively it runs a headless walk through the
//! whole story: a scripted scroll sweep, fixed-step ticks and a recorded
//! frame per second of simulated time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    match lifelines::platform::web::start("canvas") {
        // Runs for the lifetime of the page
        Ok(handle) => std::mem::forget(handle),
        Err(e) => log::error!("Failed to start: {e:?}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::DVec2;
    use lifelines::audio::AudioBus;
    use lifelines::consts::SIM_DT;
    use lifelines::dream::DreamService;
    use lifelines::images::ImageCache;
    use lifelines::input::InputBuffer;
    use lifelines::platform::unix_time_ms;
    use lifelines::render::{FrameStyle, RecordedImage, RecordingSurface, draw_frame};
    use lifelines::sim::{ScrollMapper, ScrollMetrics, SimEvent, tick};
    use lifelines::{Experience, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or(42);
    log::info!("Lifelines (headless) starting with seed {seed}");

    let mut exp =
        Experience::new(seed).with_ambient_particles(settings.quality.ambient_particles());
    let mut mapper = ScrollMapper::new(exp.levels.total_width());
    let mut input = InputBuffer::new();
    let mut audio = AudioBus::new(settings.effective_volume());
    audio.init();

    let viewport = DVec2::new(1280.0, settings.canvas_height);
    input.resize(viewport.x, viewport.y);
    input.pointer_moved(viewport.x / 2.0, viewport.y * 0.35);

    // Every photograph loads instantly
    let mut images = ImageCache::new();
    for url in exp
        .photos
        .iter()
        .map(|p| p.image_url.clone())
        .chain(exp.layers.photos().iter().map(|p| p.src.clone()))
        .collect::<Vec<_>>()
    {
        images.request(&url, |url| Some(RecordedImage::loaded(url)));
    }

    let style = FrameStyle::from(&settings);
    let mut surface = RecordingSurface::new(viewport.x, viewport.y);

    // A page ten viewports tall, scrolled top to bottom over 90 seconds
    let metrics = |fraction: f64| ScrollMetrics {
        scroll_top: fraction * viewport.y * 9.0,
        scroll_height: viewport.y * 10.0,
        viewport_height: viewport.y,
    };
    let frames = (90.0 / SIM_DT) as u64;
    let mut painted = 0usize;

    for step in 0..=frames {
        let fraction = step as f64 / frames as f64;
        input.set_world_x(mapper.map(&metrics(fraction)));
        let frame_input = input.commit(step as f64 * SIM_DT * 1000.0);
        tick(&mut exp, &frame_input);

        for event in exp.drain_events() {
            match &event {
                SimEvent::LevelChanged { id, .. } => {
                    log::info!("Level {id} at x = {:.0}", exp.world_x)
                }
                SimEvent::Collected { id, score, .. } => {
                    log::info!("Collected {id} (score {score})")
                }
                SimEvent::ZoneEntered { .. } => {}
            }
            audio.handle_event(&event);
        }

        if step % 60 == 0 {
            draw_frame(&mut surface, &exp, &images, &style);
            painted += surface.take_commands().len();
        }
    }

    log::info!(
        "Reached x = {:.0} of {:.0}, score {}, {} draw commands, {} audio cues",
        exp.world_x,
        exp.levels.total_width(),
        exp.score,
        painted,
        audio.take_played().len()
    );

    let mut dreams = DreamService::new(None, seed);
    let reply = dreams.handle(r#"{"dream": "ouvrir une école"}"#, unix_time_ms());
    log::info!("Dream reply ({}): {}", reply.status, reply.to_json());
}

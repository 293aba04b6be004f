//! Browser glue: finds the page's canvases and media elements, builds the
//! layers, and drives the frame pump from `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, MouseEvent, Window};

use crate::canvas::Canvas2d;
use crate::config::FxConfig;
use crate::error::{FxError, FxResult};
use crate::frame::{FramePump, Layer, PointerSample, Viewport};
use crate::layers::{BarsLayer, OrbLayer, ParticleLayer, StarfieldLayer};

mod audio;
mod canvas;
mod driver;
mod events;
mod render;

pub use audio::{AnalyserSource, AudioRig};
pub use canvas::{canvas_by_id, WebCanvas2d};
pub use driver::RafLoop;
pub use events::Listener;
pub use render::FractalLayer;

/// Id of the optional `<script type="application/json">` holding an [`FxConfig`].
pub const CONFIG_ELEMENT_ID: &str = "fx-config";

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let (config, config_error) = match load_config(&document) {
        Ok(config) => (config, None),
        Err(e) => (FxConfig::default(), Some(e)),
    };
    console_log::init_with_level(config.log_level()).ok();
    if let Some(e) = config_error {
        log::warn!("{e}; falling back to defaults");
    }

    let page = Page::start(&window, &document, config)?;
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
    Ok(())
}

/// Stop every layer, silence the music and detach all listeners.
#[wasm_bindgen]
pub fn teardown() {
    if let Some(page) = PAGE.with(|slot| slot.borrow_mut().take()) {
        page.stop();
    }
}

fn load_config(document: &Document) -> FxResult<FxConfig> {
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(text) => FxConfig::from_json(&text),
        None => Ok(FxConfig::default()),
    }
}

pub fn viewport_of(window: &Window) -> FxResult<Viewport> {
    let dim = |v: Result<JsValue, JsValue>| -> FxResult<u32> {
        v?.as_f64()
            .map(|px| px.max(0.0) as u32)
            .ok_or_else(|| FxError::Js("window size is not a number".into()))
    };
    Ok(Viewport::new(dim(window.inner_width())?, dim(window.inner_height())?))
}

fn seeded_rng() -> fastrand::Rng {
    fastrand::Rng::with_seed((js_sys::Math::random() * u64::MAX as f64) as u64)
}

/// Running effects for one document.
pub struct Page {
    pump: Rc<RefCell<FramePump>>,
    raf: RafLoop,
    audio: AudioRig,
    _listeners: Vec<Listener>,
}

impl Page {
    pub fn start(window: &Window, document: &Document, config: FxConfig) -> FxResult<Self> {
        let viewport = viewport_of(window)?;
        let mut rng = seeded_rng();
        let pump = Rc::new(RefCell::new(FramePump::new(viewport)));

        {
            let mut pump = pump.borrow_mut();
            let ids = &config.elements;
            // Size canvases before building layers so initial positions span the viewport.
            let sized = |id: &str| -> FxResult<WebCanvas2d> {
                let mut canvas = WebCanvas2d::by_id(document, id)?;
                canvas.set_size(viewport.width, viewport.height);
                Ok(canvas)
            };

            if config.fractal.enabled {
                mount(
                    &mut pump,
                    "fractal",
                    canvas_by_id(document, &ids.fractal)
                        .and_then(|c| FractalLayer::new(c, &config.fractal)),
                );
            }
            if config.starfield.enabled {
                mount(
                    &mut pump,
                    "starfield",
                    sized(&ids.starfield).map(|c| StarfieldLayer::new(&config.starfield, c, rng.fork())),
                );
            }
            if config.orbs.enabled {
                mount(
                    &mut pump,
                    "orbs",
                    sized(&ids.orbs).map(|c| OrbLayer::new(&config.orbs, c, rng.fork())),
                );
            }
            if config.bars.enabled {
                mount(
                    &mut pump,
                    "bars",
                    sized(&ids.visualizer).map(|c| BarsLayer::new(&config.bars, c)),
                );
            }
            if config.particles.enabled {
                mount(
                    &mut pump,
                    "particles",
                    sized(&ids.particles).map(|c| ParticleLayer::new(&config.particles, c, rng.fork())),
                );
            }
        }

        let mut audio = AudioRig::setup(window, document, &config, rng.fork()).unwrap_or_else(|e| {
            log::warn!("background music disabled: {e}");
            AudioRig::silent(&config)
        });

        let pointer: Rc<RefCell<Vec<PointerSample>>> = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Vec::new();
        {
            let pump = pump.clone();
            let win = window.clone();
            listeners.push(Listener::new(window, "resize", move |_| match viewport_of(&win) {
                Ok(vp) => pump.borrow_mut().resize(vp),
                Err(e) => log::warn!("resize ignored: {e}"),
            })?);
        }
        {
            let pointer = pointer.clone();
            listeners.push(Listener::new(window, "mousemove", move |event| {
                if let Some(e) = event.dyn_ref::<MouseEvent>() {
                    pointer.borrow_mut().push(PointerSample {
                        x: e.client_x() as f64,
                        y: e.client_y() as f64,
                    });
                }
            })?);
        }

        let mut source = audio
            .take_source()
            .unwrap_or_else(|| Box::new(crate::audio::SilentSource::new(config.audio.bin_count())));
        let live = audio.live.clone();
        let raf = {
            let pump = pump.clone();
            RafLoop::start(window, move |now| {
                let samples: Vec<PointerSample> = pointer.borrow_mut().drain(..).collect();
                pump.borrow_mut().tick(now, &mut *source, &samples, live.get());
            })?
        };

        log::info!(
            "effects running: {} layers at {}x{}",
            pump.borrow().len(),
            viewport.width,
            viewport.height
        );
        Ok(Self { pump, raf, audio, _listeners: listeners })
    }

    pub fn stop(mut self) {
        self.raf.stop();
        self.pump.borrow_mut().teardown();
        self.audio.stop();
        log::info!("effects torn down");
    }
}

fn mount<L: Layer + 'static>(pump: &mut FramePump, what: &str, layer: FxResult<L>) {
    match layer {
        Ok(layer) => {
            pump.register(Box::new(layer));
        }
        Err(e) => log::warn!("{what} layer disabled: {e}"),
    }
}

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use velleverse_fx::audio::{MUTED_ICON, UNMUTED_ICON};
use velleverse_fx::canvas::Canvas2d;
use velleverse_fx::config::FxConfig;
use velleverse_fx::layers::{BarsLayer, StarfieldLayer};
use velleverse_fx::web::{viewport_of, AudioRig, FractalLayer, RafLoop, WebCanvas2d};
use velleverse_fx::{FramePump, Layer, Viewport};

wasm_bindgen_test_configure!(run_in_browser);

fn append(tag: &str, id: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let el = document.create_element(tag).unwrap();
    el.set_id(id);
    document.body().unwrap().append_child(&el).unwrap();
    el
}

/// Music element and mute button under `prefix`-scoped ids, plus a config naming them.
fn audio_page(prefix: &str, tracks: &[&str]) -> (web_sys::HtmlMediaElement, web_sys::Element, FxConfig) {
    let mut config = FxConfig::default();
    config.elements.music = format!("{prefix}-music");
    config.elements.mute_button = format!("{prefix}-mute");
    config.elements.hover_sound = format!("{prefix}-hover");
    config.audio.tracks = tracks.iter().map(|t| t.to_string()).collect();
    let music = append("audio", &config.elements.music)
        .dyn_into::<web_sys::HtmlMediaElement>()
        .unwrap();
    let button = append("button", &config.elements.mute_button);
    (music, button, config)
}

fn rig(config: &FxConfig) -> AudioRig {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    AudioRig::setup(&window, &document, config, fastrand::Rng::with_seed(12)).unwrap()
}

fn fire(target: &web_sys::EventTarget, event: &str) {
    target.dispatch_event(&web_sys::Event::new(event).unwrap()).unwrap();
}

fn new_canvas(id: &str) -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn window_has_a_viewport() {
    let vp = viewport_of(&web_sys::window().unwrap()).unwrap();
    assert!(vp.width > 0 && vp.height > 0);
}

#[wasm_bindgen_test]
fn resize_sets_backing_store_size() {
    let config = FxConfig::default();
    let stars = new_canvas("test-stars");
    let bars = new_canvas("test-bars");

    let mut pump = FramePump::new(Viewport::new(300, 150));
    pump.register(Box::new(StarfieldLayer::new(
        &config.starfield,
        WebCanvas2d::new(stars.clone()).unwrap(),
        fastrand::Rng::with_seed(1),
    )));
    pump.register(Box::new(BarsLayer::new(&config.bars, WebCanvas2d::new(bars.clone()).unwrap())));

    pump.resize(Viewport::new(321, 123));
    for canvas in [&stars, &bars] {
        assert_eq!((canvas.width(), canvas.height()), (321, 123));
    }
}

#[wasm_bindgen_test]
fn web_canvas_draws_without_error() {
    let mut canvas = WebCanvas2d::new(new_canvas("test-draw")).unwrap();
    canvas.set_size(64, 64);
    let color = velleverse_fx::color::Color::Rgb(0, 255, 255);
    canvas.clear().unwrap();
    canvas.fill_rect(0.0, 0.0, 10.0, 10.0, color).unwrap();
    canvas.fill_circle(32.0, 32.0, 4.0, color).unwrap();
    canvas
        .fill_radial_gradient(32.0, 32.0, 20.0, &[(0.0, color), (1.0, color.with_alpha(0.0))])
        .unwrap();
}

#[wasm_bindgen_test]
fn fractal_shader_compiles_when_webgl2_is_available() {
    let canvas = new_canvas("test-fractal");
    match FractalLayer::new(canvas, &FxConfig::default().fractal) {
        Ok(mut layer) => {
            layer.resize(Viewport::new(32, 32));
            assert_eq!(layer.surface_size(), (32, 32));
        }
        // Headless browsers without GPU support report a missing context.
        Err(velleverse_fx::FxError::MissingContext(_)) => {}
        Err(e) => panic!("fractal setup failed: {e}"),
    }
}

#[wasm_bindgen_test]
fn track_end_switches_to_the_other_track() {
    let (music, _button, config) = audio_page("ended", &["one.mp3", "two.mp3"]);
    let _rig = rig(&config);

    let mut seen = vec![music.src()];
    for _ in 0..4 {
        fire(&music, "ended");
        let src = music.src();
        assert_ne!(&src, seen.last().unwrap());
        assert!(src.ends_with("one.mp3") || src.ends_with("two.mp3"), "src={src}");
        seen.push(src);
    }
    // Two tracks alternate.
    assert_eq!(seen[0], seen[2]);
    assert_eq!(seen[1], seen[3]);
}

#[wasm_bindgen_test]
fn live_flag_follows_playback_events() {
    let (music, _button, config) = audio_page("live", &["one.mp3"]);
    let rig = rig(&config);
    assert!(!rig.live.get());
    fire(&music, "play");
    assert!(rig.live.get());
    fire(&music, "pause");
    assert!(!rig.live.get());
    fire(&music, "play");
    fire(&music, "ended");
    assert!(!rig.live.get());
}

#[wasm_bindgen_test]
fn mute_button_toggles_icon_and_element() {
    let (music, button, config) = audio_page("mute", &["one.mp3"]);
    let _rig = rig(&config);
    assert_eq!(button.text_content().as_deref(), Some(UNMUTED_ICON));

    fire(&button, "click");
    assert!(music.muted());
    assert_eq!(button.text_content().as_deref(), Some(MUTED_ICON));

    fire(&button, "click");
    assert!(!music.muted());
    assert_eq!(button.text_content().as_deref(), Some(UNMUTED_ICON));
}

#[wasm_bindgen_test]
fn stopping_the_rig_detaches_and_silences() {
    let (music, button, config) = audio_page("stop", &["one.mp3", "two.mp3"]);
    let mut rig = rig(&config);
    fire(&music, "play");
    rig.stop();
    assert!(rig.context().is_none());
    assert!(!rig.live.get());
    rig.stop();

    drop(rig);
    let src = music.src();
    fire(&music, "ended");
    fire(&button, "click");
    assert_eq!(music.src(), src);
    assert!(!music.muted());
    assert!(music.paused());
}

#[wasm_bindgen_test]
fn raf_loop_releases_its_callback_on_stop() {
    let raf = RafLoop::start(&web_sys::window().unwrap(), |_| {}).unwrap();
    assert!(raf.is_running());
    raf.stop();
    assert!(!raf.is_running());
}

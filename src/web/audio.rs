//! Background music, analyser, mute control and hover sounds.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AnalyserNode, AudioContext, Document, EventTarget, HtmlMediaElement, Window};

use crate::audio::{report_playback, FrequencySource, MuteToggle, SilentSource, UnlockGate};
use crate::config::FxConfig;
use crate::error::{describe_js, FxError, FxResult};
use crate::playlist::Playlist;

use super::events::Listener;

/// Frequency snapshot straight from a Web Audio `AnalyserNode`.
pub struct AnalyserSource {
    analyser: AnalyserNode,
}

impl FrequencySource for AnalyserSource {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn refresh(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }
}

/// Everything audio-related the page keeps alive.
pub struct AudioRig {
    pub live: Rc<Cell<bool>>,
    source: Option<Box<dyn FrequencySource>>,
    music: Option<HtmlMediaElement>,
    context: Option<AudioContext>,
    _listeners: Vec<Listener>,
}

impl AudioRig {
    /// Rig with no music: silent snapshot, never live.
    pub fn silent(config: &FxConfig) -> Self {
        Self {
            live: Rc::new(Cell::new(false)),
            source: Some(Box::new(SilentSource::new(config.audio.bin_count()))),
            music: None,
            context: None,
            _listeners: Vec::new(),
        }
    }

    pub fn setup(
        window: &Window,
        document: &Document,
        config: &FxConfig,
        rng: fastrand::Rng,
    ) -> FxResult<Self> {
        let ids = &config.elements;
        let music = media_by_id(document, &ids.music)?;

        let (context, source): (Option<AudioContext>, Box<dyn FrequencySource>) =
            match build_analyser(&music, config.audio.fft_size) {
                Ok((ctx, analyser)) => (Some(ctx), Box::new(AnalyserSource { analyser })),
                Err(e) => {
                    log::warn!("audio analyser unavailable, visualizer stays flat: {e}");
                    (None, Box::new(SilentSource::new(config.audio.bin_count())))
                }
            };

        let live = Rc::new(Cell::new(false));
        let mut listeners = Vec::new();

        // Unlock on the first click anywhere.
        {
            let music = music.clone();
            let context = context.clone();
            let mut gate = UnlockGate::new();
            listeners.push(Listener::new(window, "click", move |_| {
                if !gate.try_unlock() {
                    return;
                }
                log::info!("audio unlocked");
                play(&music, "music");
                if let Some(ctx) = &context {
                    await_outcome("audio context resume", ctx.resume());
                }
            })?);
        }

        // Live flag drives the bar visualizer.
        for (event, playing) in [("play", true), ("pause", false), ("ended", false)] {
            let live = live.clone();
            listeners.push(Listener::new(&music, event, move |_| live.set(playing))?);
        }

        match playlist_for(&music, config, rng) {
            Ok(playlist) => {
                let playlist = Rc::new(RefCell::new(playlist));
                let music_el = music.clone();
                listeners.push(Listener::new(&music, "ended", move |_| {
                    let mut playlist = playlist.borrow_mut();
                    music_el.set_src(playlist.advance());
                    play(&music_el, "music");
                })?);
            }
            Err(e) => log::warn!("track auto-advance disabled: {e}"),
        }

        match document.get_element_by_id(&ids.mute_button) {
            Some(button) => {
                let mut mute = MuteToggle::new(music.muted());
                button.set_text_content(Some(mute.indicator()));
                let music = music.clone();
                let target: EventTarget = button.clone().into();
                listeners.push(Listener::new(&target, "click", move |_| {
                    music.set_muted(mute.toggle());
                    button.set_text_content(Some(mute.indicator()));
                })?);
            }
            None => log::debug!("no mute control #{}", ids.mute_button),
        }

        match media_by_id(document, &ids.hover_sound) {
            Ok(hover) => listeners.extend(hover_listeners(document, &ids.hover_links, &hover)?),
            Err(e) => log::debug!("hover sound disabled: {e}"),
        }

        Ok(Self {
            live,
            source: Some(source),
            music: Some(music),
            context,
            _listeners: listeners,
        })
    }

    /// Hand the frequency source to the frame loop (once).
    pub fn take_source(&mut self) -> Option<Box<dyn FrequencySource>> {
        self.source.take()
    }

    pub fn context(&self) -> Option<&AudioContext> {
        self.context.as_ref()
    }

    /// Pause the music and close the audio context. Safe to call twice.
    pub fn stop(&mut self) {
        if let Some(music) = self.music.take() {
            let paused = music.pause().map_err(|e| rejected("music pause", &e));
            report_playback("music pause", paused);
        }
        if let Some(ctx) = self.context.take() {
            await_outcome("audio context close", ctx.close());
        }
        self.live.set(false);
    }
}

impl Drop for AudioRig {
    fn drop(&mut self) {
        self.stop();
    }
}

fn media_by_id(document: &Document, id: &str) -> FxResult<HtmlMediaElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| FxError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlMediaElement>()
        .map_err(|_| FxError::WrongElementType { id: id.to_string(), expected: "media element" })
}

fn build_analyser(music: &HtmlMediaElement, fft_size: u32) -> FxResult<(AudioContext, AnalyserNode)> {
    let ctx = AudioContext::new()?;
    let source = ctx.create_media_element_source(music)?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(fft_size);
    source.connect_with_audio_node(&analyser)?;
    analyser.connect_with_audio_node(&ctx.destination())?;
    log::debug!("analyser ready: {} bins", analyser.frequency_bin_count());
    Ok((ctx, analyser))
}

/// Configured tracks, or the element's own source as a one-track list.
fn playlist_for(music: &HtmlMediaElement, config: &FxConfig, rng: fastrand::Rng) -> FxResult<Playlist> {
    if config.audio.tracks.is_empty() {
        let mut src = music.src();
        if src.is_empty() {
            src = music.current_src();
        }
        let tracks = if src.is_empty() { Vec::new() } else { vec![src] };
        return Playlist::starting_at(tracks, 0, rng);
    }
    let playlist = Playlist::new(config.audio.tracks.clone(), rng)?;
    log::info!("starting with track {}", playlist.current());
    music.set_src(playlist.current());
    Ok(playlist)
}

fn hover_listeners(
    document: &Document,
    selector: &str,
    hover: &HtmlMediaElement,
) -> FxResult<Vec<Listener>> {
    let links = document.query_selector_all(selector)?;
    let mut listeners = Vec::with_capacity(links.length() as usize);
    for i in 0..links.length() {
        let Some(link) = links.item(i) else { continue };
        let hover = hover.clone();
        listeners.push(Listener::new(&link, "mouseenter", move |_| {
            hover.set_current_time(0.0);
            play(&hover, "hover sound");
        })?);
    }
    log::debug!("hover sound bound to {} links", listeners.len());
    Ok(listeners)
}

fn play(media: &HtmlMediaElement, what: &'static str) {
    await_outcome(what, media.play());
}

/// Route a playback promise through [`report_playback`] without blocking.
fn await_outcome(what: &'static str, promise: Result<Promise, wasm_bindgen::JsValue>) {
    let promise = match promise {
        Ok(p) => p,
        Err(e) => {
            report_playback(what, Err(rejected(what, &e)));
            return;
        }
    };
    spawn_local(async move {
        let outcome = JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| rejected(what, &e));
        report_playback(what, outcome);
    });
}

fn rejected(what: &str, err: &wasm_bindgen::JsValue) -> FxError {
    FxError::Playback { what: what.to_string(), reason: describe_js(err) }
}

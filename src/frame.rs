//! Frame pump: one owner for every per-refresh task.
//!
//! The browser driver calls [`FramePump::tick`] from `requestAnimationFrame`;
//! each tick samples the frequency source once and hands every registered
//! layer the same read-only [`FrameInput`].

use crate::audio::FrequencySource;
use crate::error::FxResult;

/// Drawing-surface size shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn w(&self) -> f64 {
        self.width as f64
    }

    pub fn h(&self) -> f64 {
        self.height as f64
    }

    pub fn center(&self) -> (f64, f64) {
        (self.w() / 2.0, self.h() / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

/// Everything a layer may read during one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Seconds since the pump's first tick.
    pub elapsed: f64,
    /// Seconds since the previous tick (zero on the first).
    pub dt: f64,
    pub frequencies: &'a [u8],
    pub viewport: Viewport,
    pub fps: Option<f64>,
    /// Pointer positions reported since the previous tick.
    pub pointer: &'a [PointerSample],
    /// Whether background music is currently playing.
    pub audio_live: bool,
}

pub trait Layer {
    fn name(&self) -> &'static str;

    /// Match the backing surface to `viewport` and recompute derived state.
    fn resize(&mut self, viewport: Viewport);

    fn surface_size(&self) -> (u32, u32);

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

/// Counts frames over one-second windows.
#[derive(Debug, Default)]
pub struct FrameRateMeter {
    window_start: Option<f64>,
    frames: u32,
    fps: Option<f64>,
}

impl FrameRateMeter {
    const WINDOW_MS: f64 = 1000.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`; returns the latest completed measurement.
    ///
    /// The frame that opens a window only marks its start; a window of N
    /// intervals counts N frames.
    pub fn record(&mut self, now_ms: f64) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return self.fps;
        };
        self.frames += 1;
        let span = now_ms - start;
        if span >= Self::WINDOW_MS {
            self.fps = Some(self.frames as f64 * 1000.0 / span);
            self.window_start = Some(now_ms);
            self.frames = 0;
        }
        self.fps
    }

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    pub fn reset(&mut self) {
        self.window_start = None;
        self.frames = 0;
        self.fps = None;
    }
}

pub struct FramePump {
    layers: Vec<(LayerId, Box<dyn Layer>)>,
    next_id: u32,
    viewport: Viewport,
    snapshot: Vec<u8>,
    meter: FrameRateMeter,
    first_tick: Option<f64>,
    last_tick: Option<f64>,
    running: bool,
}

impl FramePump {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            layers: Vec::new(),
            next_id: 0,
            viewport,
            snapshot: Vec::new(),
            meter: FrameRateMeter::new(),
            first_tick: None,
            last_tick: None,
            running: true,
        }
    }

    /// Add a layer; it is resized to the current viewport before its first frame.
    pub fn register(&mut self, mut layer: Box<dyn Layer>) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        layer.resize(self.viewport);
        log::info!("layer '{}' registered", layer.name());
        self.layers.push((id, layer));
        id
    }

    pub fn deregister(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let pos = self.layers.iter().position(|(lid, _)| *lid == id)?;
        let (_, layer) = self.layers.remove(pos);
        log::info!("layer '{}' deregistered", layer.name());
        Some(layer)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("resize to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        for (_, layer) in self.layers.iter_mut() {
            layer.resize(viewport);
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Latest frequency snapshot handed to layers.
    pub fn snapshot(&self) -> &[u8] {
        &self.snapshot
    }

    pub fn fps(&self) -> Option<f64> {
        self.meter.fps()
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &dyn Layer)> + '_ {
        self.layers.iter().map(|(id, layer)| (*id, layer.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            log::info!("frame pump started");
            self.running = true;
        }
    }

    /// Pause ticking. The next tick after `start` reports `dt == 0`.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("frame pump stopped");
            self.running = false;
            self.last_tick = None;
            self.meter.reset();
        }
    }

    /// Stop and drop every layer.
    pub fn teardown(&mut self) {
        self.stop();
        for (_, layer) in self.layers.drain(..) {
            log::debug!("layer '{}' torn down", layer.name());
        }
    }

    /// Run one frame across every layer; returns how many layers ran.
    ///
    /// A layer whose frame fails is logged and removed; the rest still run.
    pub fn tick(
        &mut self,
        now_ms: f64,
        source: &mut dyn FrequencySource,
        pointer: &[PointerSample],
        audio_live: bool,
    ) -> usize {
        if !self.running {
            return 0;
        }

        self.snapshot.resize(source.bin_count(), 0);
        source.refresh(&mut self.snapshot);

        let first = *self.first_tick.get_or_insert(now_ms);
        let dt = self
            .last_tick
            .map(|last| ((now_ms - last) / 1000.0).max(0.0))
            .unwrap_or(0.0);
        self.last_tick = Some(now_ms);
        let fps = self.meter.record(now_ms);

        let input = FrameInput {
            elapsed: (now_ms - first) / 1000.0,
            dt,
            frequencies: &self.snapshot,
            viewport: self.viewport,
            fps,
            pointer,
            audio_live,
        };

        let mut failed = Vec::new();
        for (id, layer) in self.layers.iter_mut() {
            if let Err(e) = layer.frame(&input) {
                log::error!("layer '{}' failed, removing it: {e}", layer.name());
                failed.push(*id);
            }
        }
        let ran = self.layers.len() - failed.len();
        self.layers.retain(|(id, _)| !failed.contains(id));
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StaticSource;
    use crate::error::FxError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        size: (u32, u32),
        frames: Vec<(f64, Vec<u8>, usize)>,
        fail: bool,
    }

    struct ProbeLayer(Rc<RefCell<Probe>>);

    impl Layer for ProbeLayer {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn resize(&mut self, viewport: Viewport) {
            self.0.borrow_mut().size = (viewport.width, viewport.height);
        }

        fn surface_size(&self) -> (u32, u32) {
            self.0.borrow().size
        }

        fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
            let mut probe = self.0.borrow_mut();
            if probe.fail {
                return Err(FxError::MissingContext("probe"));
            }
            probe
                .frames
                .push((input.dt, input.frequencies.to_vec(), input.pointer.len()));
            Ok(())
        }
    }

    fn probe() -> (Rc<RefCell<Probe>>, Box<dyn Layer>) {
        let shared = Rc::new(RefCell::new(Probe::default()));
        (shared.clone(), Box::new(ProbeLayer(shared)))
    }

    #[test]
    fn register_resizes_to_current_viewport() {
        let mut pump = FramePump::new(Viewport::new(640, 480));
        let (state, layer) = probe();
        pump.register(layer);
        assert_eq!(state.borrow().size, (640, 480));
    }

    #[test]
    fn tick_shares_one_snapshot_and_measures_dt() {
        let mut pump = FramePump::new(Viewport::new(10, 10));
        let (a, la) = probe();
        let (b, lb) = probe();
        pump.register(la);
        pump.register(lb);
        let mut source = StaticSource::new(vec![1, 2, 3]);
        let pointer = [PointerSample { x: 1.0, y: 2.0 }];

        assert_eq!(pump.tick(1000.0, &mut source, &pointer, true), 2);
        assert_eq!(pump.tick(1016.0, &mut source, &[], true), 2);

        let a = a.borrow();
        assert_eq!(a.frames[0], (0.0, vec![1, 2, 3], 1));
        assert!((a.frames[1].0 - 0.016).abs() < 1e-9);
        assert_eq!(a.frames[1].2, 0);
        assert_eq!(b.borrow().frames.len(), 2);
    }

    #[test]
    fn failing_layer_is_removed_others_continue() {
        let mut pump = FramePump::new(Viewport::new(10, 10));
        let (bad, lbad) = probe();
        let (good, lgood) = probe();
        bad.borrow_mut().fail = true;
        pump.register(lbad);
        pump.register(lgood);
        let mut source = StaticSource::new(vec![0; 4]);

        assert_eq!(pump.tick(0.0, &mut source, &[], false), 1);
        assert_eq!(pump.len(), 1);
        assert_eq!(pump.tick(16.0, &mut source, &[], false), 1);
        assert_eq!(good.borrow().frames.len(), 2);
    }

    #[test]
    fn stop_deregister_and_teardown() {
        let mut pump = FramePump::new(Viewport::new(10, 10));
        let (state, layer) = probe();
        let id = pump.register(layer);
        let mut source = StaticSource::new(vec![0; 2]);

        pump.stop();
        assert_eq!(pump.tick(0.0, &mut source, &[], false), 0);
        pump.start();
        assert_eq!(pump.tick(5000.0, &mut source, &[], false), 1);
        assert_eq!(state.borrow().frames[0].0, 0.0);

        assert!(pump.deregister(id).is_some());
        assert!(pump.deregister(id).is_none());

        let (_, again) = probe();
        pump.register(again);
        pump.teardown();
        assert!(pump.is_empty());
        assert!(!pump.is_running());
    }

    #[test]
    fn meter_reports_after_first_window() {
        let mut meter = FrameRateMeter::new();
        let mut last = None;
        for i in 0..=60 {
            last = meter.record(i as f64 * 1000.0 / 60.0);
            if i < 60 {
                assert_eq!(last, None);
            }
        }
        assert_eq!(last, Some(60.0));

        // Next window starts on the frame that closed the previous one.
        for i in 61..=120 {
            last = meter.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(last, Some(60.0));
    }

    #[test]
    fn restart_forgets_previous_frame_rate() {
        let mut pump = FramePump::new(Viewport::new(10, 10));
        let mut source = StaticSource::new(vec![0; 4]);
        for i in 0..=22 {
            pump.tick(i as f64 * 50.0, &mut source, &[], false);
        }
        let fps = pump.fps().unwrap();
        assert!((fps - 20.0).abs() < 1e-9, "fps={fps}");

        pump.stop();
        assert_eq!(pump.fps(), None);
        pump.start();
        pump.tick(100_000.0, &mut source, &[], false);
        assert_eq!(pump.fps(), None);

        // No stale reading means no low-fps cap on the first frames back.
        let mut particles = crate::layers::particles::ParticleSystem::new(
            &crate::config::ParticleConfig::default(),
            fastrand::Rng::with_seed(4),
        );
        for i in 0..40 {
            particles.spawn_burst(i as f64, 0.0);
        }
        particles.step(pump.fps());
        assert_eq!(particles.len(), 120);
    }
}

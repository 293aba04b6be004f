//! Drifting, audio-reactive glow orbs.

use std::f64::consts::TAU;

use crate::canvas::Canvas2d;
use crate::color::Color;
use crate::config::OrbConfig;
use crate::error::FxResult;
use crate::frame::{FrameInput, Layer, Viewport};

use super::uniform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    /// Degrees in [0, 360).
    pub hue: f64,
    pub phase: f64,
}

/// Per-frame drawn size and brightness of an orb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbAppearance {
    pub radius: f64,
    pub glow: f64,
}

/// Toroidal wrap: leaving past `-radius` re-enters at `extent + radius` and
/// vice versa.
pub fn wrap(value: f64, radius: f64, extent: f64) -> f64 {
    if value < -radius {
        extent + radius
    } else if value > extent + radius {
        -radius
    } else {
        value
    }
}

pub struct OrbField {
    orbs: Vec<Orb>,
    viewport: Viewport,
    config: OrbConfig,
}

impl OrbField {
    pub fn new(config: &OrbConfig, viewport: Viewport, mut rng: fastrand::Rng) -> Self {
        let orbs = (0..config.count)
            .map(|_| Orb {
                x: rng.f64() * viewport.w(),
                y: rng.f64() * viewport.h(),
                vx: uniform(&mut rng, -config.max_speed, config.max_speed),
                vy: uniform(&mut rng, -config.max_speed, config.max_speed),
                radius: uniform(&mut rng, config.min_radius, config.max_radius),
                hue: rng.f64() * 360.0,
                phase: rng.f64() * TAU,
            })
            .collect();
        Self { orbs, viewport, config: config.clone() }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn step(&mut self) {
        let (w, h) = (self.viewport.w(), self.viewport.h());
        for orb in self.orbs.iter_mut() {
            orb.x = wrap(orb.x + orb.vx, orb.radius, w);
            orb.y = wrap(orb.y + orb.vy, orb.radius, h);
            orb.hue = (orb.hue + self.config.hue_speed).rem_euclid(360.0);
            orb.phase = (orb.phase + self.config.pulse_speed).rem_euclid(TAU);
        }
    }

    /// Size and glow of orb `index`, modulated by bin `index % bins`.
    pub fn appearance(&self, index: usize, frequencies: &[u8]) -> OrbAppearance {
        let orb = &self.orbs[index];
        let cfg = &self.config;
        let level = if cfg.audio_reactive && !frequencies.is_empty() {
            frequencies[index % frequencies.len()] as f64 / 255.0
        } else {
            0.0
        };
        let pulse = 1.0 + cfg.pulse_depth * orb.phase.sin();
        OrbAppearance {
            radius: (orb.radius * pulse * (1.0 + cfg.reactivity * level)).max(0.0),
            glow: ((cfg.base_glow + cfg.glow_gain * level) * pulse).clamp(0.0, 1.0),
        }
    }
}

pub struct OrbLayer<C: Canvas2d> {
    field: OrbField,
    canvas: C,
}

impl<C: Canvas2d> OrbLayer<C> {
    pub fn new(config: &OrbConfig, canvas: C, rng: fastrand::Rng) -> Self {
        let (width, height) = canvas.size();
        Self { field: OrbField::new(config, Viewport::new(width, height), rng), canvas }
    }

    pub fn field(&self) -> &OrbField {
        &self.field
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}

impl<C: Canvas2d> Layer for OrbLayer<C> {
    fn name(&self) -> &'static str {
        "orbs"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_size(viewport.width, viewport.height);
        self.field.resize(viewport);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
        self.field.step();
        self.canvas.clear()?;
        for (i, orb) in self.field.orbs().iter().enumerate() {
            let look = self.field.appearance(i, input.frequencies);
            let core = Color::Hsla { h: orb.hue, s: 100.0, l: 60.0, a: look.glow };
            let stops = [(0.0, core), (1.0, core.with_alpha(0.0))];
            self.canvas.fill_radial_gradient(orb.x, orb.y, look.radius, &stops)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    #[test]
    fn wrap_reenters_on_opposite_edge() {
        assert_eq!(wrap(-11.0, 10.0, 100.0), 110.0);
        assert_eq!(wrap(111.0, 10.0, 100.0), -10.0);
        assert_eq!(wrap(-10.0, 10.0, 100.0), -10.0);
        assert_eq!(wrap(50.0, 10.0, 100.0), 50.0);
    }

    #[test]
    fn positions_stay_within_extended_bounds() {
        let config = OrbConfig { count: 12, max_speed: 25.0, ..OrbConfig::default() };
        let vp = Viewport::new(320, 240);
        let mut field = OrbField::new(&config, vp, fastrand::Rng::with_seed(21));
        for _ in 0..5000 {
            field.step();
            for orb in field.orbs() {
                assert!(orb.x >= -orb.radius && orb.x <= vp.w() + orb.radius);
                assert!(orb.y >= -orb.radius && orb.y <= vp.h() + orb.radius);
                assert!((0.0..360.0).contains(&orb.hue));
            }
        }
    }

    #[test]
    fn louder_bins_grow_orbs() {
        let config = OrbConfig { count: 3, ..OrbConfig::default() };
        let field = OrbField::new(&config, Viewport::new(100, 100), fastrand::Rng::with_seed(4));
        // Three orbs over two bins: orb 2 reads bin 0.
        let quiet = field.appearance(2, &[0, 0]);
        let loud = field.appearance(2, &[255, 0]);
        assert!(loud.radius > quiet.radius);
        assert!(loud.glow > quiet.glow);
        assert_eq!(field.appearance(1, &[255, 0]), field.appearance(1, &[0, 0]));
        assert_eq!(field.appearance(2, &[]), quiet);
    }

    #[test]
    fn pulse_modulates_glow_as_well_as_radius() {
        let config = OrbConfig { count: 1, ..OrbConfig::default() };
        let mut field = OrbField::new(&config, Viewport::new(100, 100), fastrand::Rng::with_seed(6));
        field.orbs[0].phase = std::f64::consts::FRAC_PI_2;
        let swell = field.appearance(0, &[0]);
        field.orbs[0].phase = 3.0 * std::f64::consts::FRAC_PI_2;
        let ebb = field.appearance(0, &[0]);
        assert!(swell.radius > ebb.radius);
        assert!((swell.glow - 0.25 * 1.15).abs() < 1e-9, "glow={}", swell.glow);
        assert!((ebb.glow - 0.25 * 0.85).abs() < 1e-9, "glow={}", ebb.glow);
    }

    #[test]
    fn non_reactive_orbs_ignore_audio() {
        let config = OrbConfig { count: 1, audio_reactive: false, ..OrbConfig::default() };
        let field = OrbField::new(&config, Viewport::new(100, 100), fastrand::Rng::with_seed(4));
        assert_eq!(field.appearance(0, &[255]), field.appearance(0, &[0]));
    }

    #[test]
    fn frame_draws_one_gradient_per_orb() {
        let config = OrbConfig { count: 4, ..OrbConfig::default() };
        let mut layer = OrbLayer::new(&config, RecordingCanvas::new(200, 200), fastrand::Rng::with_seed(8));
        let input = FrameInput {
            elapsed: 0.0,
            dt: 0.0,
            frequencies: &[128; 8],
            viewport: Viewport::new(200, 200),
            fps: None,
            pointer: &[],
            audio_live: true,
        };
        layer.frame(&input).unwrap();
        let gradients = layer
            .canvas()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::RadialGradient { .. }))
            .count();
        assert_eq!(gradients, 4);
    }
}

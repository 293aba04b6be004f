//! Pointer-spawned sparks that fall under gravity and fade out.

use crate::canvas::Canvas2d;
use crate::color::Color;
use crate::config::ParticleConfig;
use crate::error::FxResult;
use crate::frame::{FrameInput, Layer, Viewport};

use super::uniform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life in (0, 1]; the particle is dropped once it hits zero.
    pub life: f64,
    pub hue: f64,
    pub size: f64,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    config: ParticleConfig,
    rng: fastrand::Rng,
}

impl ParticleSystem {
    pub fn new(config: &ParticleConfig, rng: fastrand::Rng) -> Self {
        Self { particles: Vec::new(), config: config.clone(), rng }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Spawn one batch at the pointer position.
    pub fn spawn_burst(&mut self, x: f64, y: f64) {
        let cfg = &self.config;
        for _ in 0..cfg.spawn_batch {
            self.particles.push(Particle {
                x,
                y,
                vx: uniform(&mut self.rng, -cfg.spread, cfg.spread),
                vy: uniform(&mut self.rng, -cfg.spread, cfg.spread),
                life: 1.0,
                hue: self.rng.f64() * 360.0,
                size: uniform(&mut self.rng, cfg.min_size, cfg.max_size),
            });
        }
        Self::keep_newest(&mut self.particles, cfg.max_particles);
    }

    /// Integrate one frame, drop expired particles and, when `fps` has fallen
    /// below the threshold, shed the oldest down to the low-fps cap.
    pub fn step(&mut self, fps: Option<f64>) {
        let cfg = &self.config;
        for p in self.particles.iter_mut() {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += cfg.gravity;
            p.life -= cfg.decay;
        }
        self.particles.retain(|p| p.life > 0.0);

        if fps.is_some_and(|fps| fps < cfg.low_fps_threshold) {
            if self.particles.len() > cfg.low_fps_cap {
                log::debug!(
                    "fps below {}, capping particles at {}",
                    cfg.low_fps_threshold,
                    cfg.low_fps_cap
                );
            }
            Self::keep_newest(&mut self.particles, cfg.low_fps_cap);
        }
    }

    fn keep_newest(particles: &mut Vec<Particle>, cap: usize) {
        if particles.len() > cap {
            let excess = particles.len() - cap;
            particles.drain(..excess);
        }
    }
}

pub struct ParticleLayer<C: Canvas2d> {
    system: ParticleSystem,
    canvas: C,
}

impl<C: Canvas2d> ParticleLayer<C> {
    pub fn new(config: &ParticleConfig, canvas: C, rng: fastrand::Rng) -> Self {
        Self { system: ParticleSystem::new(config, rng), canvas }
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}

impl<C: Canvas2d> Layer for ParticleLayer<C> {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_size(viewport.width, viewport.height);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
        for sample in input.pointer {
            self.system.spawn_burst(sample.x, sample.y);
        }
        self.system.step(input.fps);

        self.canvas.clear()?;
        for p in self.system.particles() {
            let color = Color::Hsla { h: p.hue, s: 100.0, l: 60.0, a: p.life };
            self.canvas.fill_circle(p.x, p.y, p.size * p.life, color)?;
        }
        Ok(())
    }
}

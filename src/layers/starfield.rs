//! Perspective starfield with motion trails.
//!
//! Stars fly toward the viewer: each frame their depth shrinks by a fixed
//! speed, and a star reaching the viewer plane is recycled at full depth with
//! a fresh screen position. Depth is always kept in `(0, max_depth]`, where
//! `max_depth` is the viewport width.

use crate::canvas::Canvas2d;
use crate::color::Color;
use crate::config::StarfieldConfig;
use crate::error::FxResult;
use crate::frame::{FrameInput, Layer, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Where and how a star is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedStar {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
}

pub struct Starfield {
    stars: Vec<Star>,
    viewport: Viewport,
    speed: f64,
    focal_length: f64,
    max_size: f64,
    rng: fastrand::Rng,
}

impl Starfield {
    pub fn new(config: &StarfieldConfig, viewport: Viewport, mut rng: fastrand::Rng) -> Self {
        let max_depth = depth_for(viewport);
        let stars = (0..config.count)
            .map(|_| Star {
                x: rng.f64() * viewport.w(),
                y: rng.f64() * viewport.h(),
                // (0, max] rather than [0, max)
                z: max_depth * (1.0 - rng.f64()),
            })
            .collect();
        Self {
            stars,
            viewport,
            speed: config.speed,
            focal_length: config.focal_length,
            max_size: config.max_size,
            rng,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn max_depth(&self) -> f64 {
        depth_for(self.viewport)
    }

    /// Advance every star one frame toward the viewer.
    pub fn step(&mut self) {
        let max_depth = self.max_depth();
        let (w, h) = (self.viewport.w(), self.viewport.h());
        for star in self.stars.iter_mut() {
            star.z -= self.speed;
            if star.z <= 0.0 {
                star.z = max_depth;
                star.x = self.rng.f64() * w;
                star.y = self.rng.f64() * h;
            }
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let max_depth = self.max_depth();
        for star in self.stars.iter_mut() {
            star.z = star.z.min(max_depth);
        }
    }

    pub fn project(&self, star: &Star) -> ProjectedStar {
        let (cx, cy) = self.viewport.center();
        let k = self.focal_length / star.z;
        let nearness = 1.0 - star.z / self.max_depth();
        ProjectedStar {
            x: (star.x - cx) * k + cx,
            y: (star.y - cy) * k + cy,
            radius: nearness * self.max_size,
            opacity: nearness,
        }
    }
}

fn depth_for(viewport: Viewport) -> f64 {
    viewport.w().max(1.0)
}

pub struct StarfieldLayer<C: Canvas2d> {
    field: Starfield,
    canvas: C,
    color: Color,
    trail: Color,
}

impl<C: Canvas2d> StarfieldLayer<C> {
    pub fn new(config: &StarfieldConfig, canvas: C, rng: fastrand::Rng) -> Self {
        let (width, height) = canvas.size();
        let [r, g, b] = config.color;
        Self {
            field: Starfield::new(config, Viewport::new(width, height), rng),
            canvas,
            color: Color::Rgb(r, g, b),
            trail: Color::Rgba(0, 0, 0, config.trail_alpha),
        }
    }

    pub fn field(&self) -> &Starfield {
        &self.field
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}

impl<C: Canvas2d> Layer for StarfieldLayer<C> {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_size(viewport.width, viewport.height);
        self.field.resize(viewport);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
        let vp = input.viewport;
        // Translucent overlay instead of a clear leaves trails behind.
        self.canvas.fill_rect(0.0, 0.0, vp.w(), vp.h(), self.trail)?;
        self.field.step();
        for star in self.field.stars() {
            let p = self.field.project(star);
            if p.radius <= 0.0 {
                continue;
            }
            self.canvas
                .fill_circle(p.x, p.y, p.radius, self.color.with_alpha(p.opacity))?;
        }
        Ok(())
    }
}

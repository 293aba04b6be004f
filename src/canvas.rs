//! 2D drawing surface abstraction.
//!
//! Layers draw through [`Canvas2d`] so the same animation code runs against a
//! browser `<canvas>` on wasm and against [`RecordingCanvas`] everywhere else.

use crate::color::Color;
use crate::error::FxResult;

pub trait Canvas2d {
    /// Backing-store size in pixels.
    fn size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    fn clear(&mut self) -> FxResult<()>;

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> FxResult<()>;

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) -> FxResult<()>;

    /// Circle filled with a radial gradient centred on `(x, y)`.
    /// `stops` are `(offset in [0, 1], colour)` pairs.
    fn fill_radial_gradient(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        stops: &[(f64, Color)],
    ) -> FxResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect { x: f64, y: f64, w: f64, h: f64, color: Color },
    Circle { x: f64, y: f64, radius: f64, color: Color },
    RadialGradient { x: f64, y: f64, radius: f64, stops: Vec<(f64, Color)> },
}

/// Headless canvas that records every draw call.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, commands: Vec::new() }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas2d for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) -> FxResult<()> {
        // A clear wipes everything drawn before it, so only keep the last frame.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> FxResult<()> {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
        Ok(())
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) -> FxResult<()> {
        self.commands.push(DrawCommand::Circle { x, y, radius, color });
        Ok(())
    }

    fn fill_radial_gradient(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        stops: &[(f64, Color)],
    ) -> FxResult<()> {
        self.commands.push(DrawCommand::RadialGradient {
            x,
            y,
            radius,
            stops: stops.to_vec(),
        });
        Ok(())
    }
}

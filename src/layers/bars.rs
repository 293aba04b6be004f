//! Frequency bar visualizer. Bars mirror the latest snapshot directly, with
//! no smoothing between frames.

use serde::Deserialize;

use crate::canvas::Canvas2d;
use crate::color::Color;
use crate::config::BarsConfig;
use crate::error::FxResult;
use crate::frame::{FrameInput, Layer, Viewport};

/// Magnitude to bar height mapping.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BarScaling {
    /// Fixed pixels per magnitude unit.
    Linear {
        #[serde(default = "one")]
        px_per_unit: f64,
    },
    /// Full-scale magnitude reaches this fraction of the viewport height.
    Normalized {
        #[serde(default = "one")]
        max_fraction: f64,
    },
}

fn one() -> f64 {
    1.0
}

impl Default for BarScaling {
    fn default() -> Self {
        BarScaling::Linear { px_per_unit: 1.0 }
    }
}

impl BarScaling {
    pub fn max_height(&self, viewport_height: f64) -> f64 {
        match *self {
            BarScaling::Linear { px_per_unit } => 255.0 * px_per_unit,
            BarScaling::Normalized { max_fraction } => viewport_height * max_fraction,
        }
    }

    pub fn height(&self, magnitude: u8, viewport_height: f64) -> f64 {
        self.max_height(viewport_height) * magnitude as f64 / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

/// Colour wheel built from three phase-shifted sines.
pub fn bar_color(index: usize, hue_step: f64, phase: f64) -> Color {
    let t = index as f64 * hue_step + phase;
    let channel = |offset: f64| (128.0 + 127.0 * (t + offset).sin()).floor() as u8;
    Color::Rgb(channel(0.0), channel(2.0), channel(4.0))
}

/// Lay out one bar per bin, left to right, bottom-aligned.
pub fn layout(frequencies: &[u8], viewport: Viewport, config: &BarsConfig, elapsed: f64) -> Vec<Bar> {
    if frequencies.is_empty() {
        return Vec::new();
    }
    let width = viewport.w() / frequencies.len() as f64 * config.width_factor;
    let phase = elapsed * config.hue_drift;
    let mut x = 0.0;
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &magnitude)| {
            let height = config.scaling.height(magnitude, viewport.h());
            let bar = Bar {
                x,
                y: viewport.h() - height,
                width,
                height,
                color: bar_color(i, config.hue_step, phase),
            };
            x += width + config.gutter;
            bar
        })
        .collect()
}

pub struct BarsLayer<C: Canvas2d> {
    canvas: C,
    config: BarsConfig,
}

impl<C: Canvas2d> BarsLayer<C> {
    pub fn new(config: &BarsConfig, canvas: C) -> Self {
        Self { canvas, config: config.clone() }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}

impl<C: Canvas2d> Layer for BarsLayer<C> {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_size(viewport.width, viewport.height);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
        self.canvas.clear()?;
        if self.config.require_playback && !input.audio_live {
            return Ok(());
        }
        for bar in layout(input.frequencies, input.viewport, &self.config, input.elapsed) {
            if bar.height > 0.0 {
                self.canvas.fill_rect(bar.x, bar.y, bar.width, bar.height, bar.color)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    #[test]
    fn height_is_proportional_to_magnitude() {
        let linear = BarScaling::Linear { px_per_unit: 2.0 };
        assert_eq!(linear.height(0, 600.0), 0.0);
        assert_eq!(linear.height(255, 600.0), 510.0);
        assert_eq!(linear.height(51, 600.0), 102.0);

        let normalized = BarScaling::Normalized { max_fraction: 0.5 };
        assert_eq!(normalized.height(0, 600.0), 0.0);
        assert_eq!(normalized.height(255, 600.0), 300.0);
        for m in 1..=255u8 {
            let ratio = normalized.height(m, 600.0) / m as f64;
            assert!((ratio - 300.0 / 255.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bars_tile_left_to_right_with_gutter() {
        let config = BarsConfig::default();
        let bars = layout(&[10, 0, 255, 40], Viewport::new(400, 300), &config, 0.0);
        assert_eq!(bars.len(), 4);
        let width = 400.0 / 4.0 * 2.5;
        for (i, bar) in bars.iter().enumerate() {
            assert_eq!(bar.width, width);
            assert_eq!(bar.x, i as f64 * (width + 1.0));
            assert_eq!(bar.y + bar.height, 300.0);
        }
        assert_eq!(bars[1].height, 0.0);
        assert_eq!(bars[2].height, 255.0);
    }

    #[test]
    fn colours_follow_sine_wheel() {
        assert_eq!(bar_color(0, 0.3, 0.0), Color::Rgb(128, 243, 31));
        assert_ne!(bar_color(1, 0.3, 0.0), bar_color(1, 0.3, 1.0));
    }

    #[test]
    fn waits_for_playback() {
        let mut layer = BarsLayer::new(&BarsConfig::default(), RecordingCanvas::new(100, 100));
        let mut input = FrameInput {
            elapsed: 0.0,
            dt: 0.0,
            frequencies: &[200, 100],
            viewport: Viewport::new(100, 100),
            fps: None,
            pointer: &[],
            audio_live: false,
        };
        layer.frame(&input).unwrap();
        assert_eq!(layer.canvas().commands(), &[DrawCommand::Clear]);

        input.audio_live = true;
        layer.frame(&input).unwrap();
        assert_eq!(layer.canvas().commands().len(), 3);
    }
}

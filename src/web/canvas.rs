use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::canvas::Canvas2d;
use crate::color::Color;
use crate::error::{FxError, FxResult};

/// Look up a `<canvas>` by id.
pub fn canvas_by_id(document: &Document, id: &str) -> FxResult<HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| FxError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| FxError::WrongElementType { id: id.to_string(), expected: "canvas" })
}

/// [`Canvas2d`] over a browser canvas and its 2D context.
pub struct WebCanvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas2d {
    pub fn new(canvas: HtmlCanvasElement) -> FxResult<Self> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(FxError::MissingContext("2d"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FxError::MissingContext("2d"))?;
        Ok(Self { canvas, ctx })
    }

    pub fn by_id(document: &Document, id: &str) -> FxResult<Self> {
        Self::new(canvas_by_id(document, id)?)
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn circle_path(&self, x: f64, y: f64, radius: f64) -> FxResult<()> {
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU)?;
        Ok(())
    }
}

impl Canvas2d for WebCanvas2d {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) -> FxResult<()> {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> FxResult<()> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x, y, w, h);
        Ok(())
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) -> FxResult<()> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.circle_path(x, y, radius)?;
        self.ctx.fill();
        Ok(())
    }

    fn fill_radial_gradient(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        stops: &[(f64, Color)],
    ) -> FxResult<()> {
        let radius = radius.max(0.0);
        let gradient = self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius)?;
        for (offset, color) in stops {
            gradient.add_color_stop(offset.clamp(0.0, 1.0) as f32, &color.to_css())?;
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.circle_path(x, y, radius)?;
        self.ctx.fill();
        Ok(())
    }
}

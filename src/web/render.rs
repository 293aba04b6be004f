//! WebGL2 fractal background layer.

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::config::FractalConfig;
use crate::error::{FxError, FxResult};
use crate::fractal::{FractalClock, FRAGMENT_SHADER, FULLSCREEN_QUAD, VERTEX_SHADER};
use crate::frame::{FrameInput, Layer, Viewport};

pub struct FractalLayer {
    canvas: HtmlCanvasElement,
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    u_time: Option<WebGlUniformLocation>,
    u_resolution: Option<WebGlUniformLocation>,
    clock: FractalClock,
}

impl FractalLayer {
    /// Compile the shaders and upload the quad. Any failure aborts this layer only.
    pub fn new(canvas: HtmlCanvasElement, config: &FractalConfig) -> FxResult<Self> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or(FxError::MissingContext("webgl2"))?
            .dyn_into()
            .map_err(|_| FxError::MissingContext("webgl2"))?;

        let vert = compile_shader(&gl, GL::VERTEX_SHADER, "vertex", VERTEX_SHADER)?;
        let frag = compile_shader(&gl, GL::FRAGMENT_SHADER, "fragment", FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vert, &frag)?;
        // The linked program keeps what it needs.
        gl.delete_shader(Some(&vert));
        gl.delete_shader(Some(&frag));

        let vao = gl
            .create_vertex_array()
            .ok_or(FxError::GpuAlloc("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = gl.create_buffer().ok_or(FxError::GpuAlloc("vertex buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let vertices = js_sys::Float32Array::from(&FULLSCREEN_QUAD[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

        let position = gl.get_attrib_location(&program, "a_position");
        if position < 0 {
            return Err(FxError::ProgramLink("a_position attribute missing".into()));
        }
        gl.enable_vertex_attrib_array(position as u32);
        gl.vertex_attrib_pointer_with_i32(position as u32, 2, GL::FLOAT, false, 0, 0);
        gl.bind_vertex_array(None);

        let u_time = gl.get_uniform_location(&program, "u_time");
        let u_resolution = gl.get_uniform_location(&program, "u_resolution");

        log::info!("fractal shader ready");
        Ok(Self {
            canvas,
            gl,
            program,
            vao,
            u_time,
            u_resolution,
            clock: FractalClock::new(config.time_scale),
        })
    }
}

fn compile_shader(gl: &GL, kind: u32, stage: &'static str, source: &str) -> FxResult<WebGlShader> {
    let shader = gl.create_shader(kind).ok_or(FxError::GpuAlloc("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(FxError::ShaderCompile { stage, log })
    }
}

fn link_program(gl: &GL, vert: &WebGlShader, frag: &WebGlShader) -> FxResult<WebGlProgram> {
    let program = gl.create_program().ok_or(FxError::GpuAlloc("program"))?;
    gl.attach_shader(&program, vert);
    gl.attach_shader(&program, frag);
    gl.link_program(&program);
    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(FxError::ProgramLink(log))
    }
}

impl Layer for FractalLayer {
    fn name(&self) -> &'static str {
        "fractal"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        self.gl
            .viewport(0, 0, viewport.width as i32, viewport.height as i32);
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn frame(&mut self, input: &FrameInput<'_>) -> FxResult<()> {
        let t = self.clock.advance(input.dt);
        let (w, h) = self.surface_size();

        let gl = &self.gl;
        gl.use_program(Some(&self.program));
        gl.uniform1f(self.u_time.as_ref(), t);
        gl.uniform2f(self.u_resolution.as_ref(), w as f32, h as f32);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::TRIANGLES, 0, (FULLSCREEN_QUAD.len() / 2) as i32);
        gl.bind_vertex_array(None);
        Ok(())
    }
}

impl Drop for FractalLayer {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_program(Some(&self.program));
    }
}

//! Fractal background: shader sources, the full-screen quad, the time
//! accumulator, and a CPU copy of the fragment shader's colour function.
//!
//! The shader is a pure function of `(time, pixel, resolution)`. Keep
//! [`fractal_color`] in step with [`FRAGMENT_SHADER`] when changing either.

pub const FOLD_ITERATIONS: usize = 8;

pub const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform float u_time;
uniform vec2 u_resolution;
out vec4 out_color;

vec3 palette(float t) {
    return 0.5 + 0.5 * cos(6.28318 * (t + vec3(0.0, 0.33, 0.67)));
}

void main() {
    vec2 z = (gl_FragCoord.xy * 2.0 - u_resolution) / min(u_resolution.x, u_resolution.y);
    vec2 c = vec2(0.8 + 0.1 * sin(u_time * 0.21), 0.55 + 0.1 * cos(u_time * 0.17));
    vec3 col = vec3(0.0);
    for (int i = 0; i < 8; i++) {
        z = abs(z) / max(dot(z, z), 1e-4) - c;
        float d = length(z);
        col += palette(d * 0.25 + float(i) * 0.1 + u_time * 0.05) * exp(-d);
    }
    out_color = vec4(col / 8.0, 1.0);
}
"#;

/// Two triangles covering clip space.
pub const FULLSCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

/// Seconds fed to `u_time`.
#[derive(Debug, Clone)]
pub struct FractalClock {
    time: f64,
    scale: f64,
}

impl FractalClock {
    pub fn new(scale: f64) -> Self {
        Self { time: 0.0, scale }
    }

    pub fn advance(&mut self, dt: f64) -> f32 {
        self.time += dt.max(0.0) * self.scale;
        self.time as f32
    }

    pub fn time(&self) -> f32 {
        self.time as f32
    }
}

/// Pixel coordinate to the shader's aspect-corrected plane: the shorter
/// side spans [-1, 1] and the centre maps to the origin.
pub fn plane_coords(frag: (f32, f32), resolution: (f32, f32)) -> (f32, f32) {
    let m = resolution.0.min(resolution.1);
    ((frag.0 * 2.0 - resolution.0) / m, (frag.1 * 2.0 - resolution.1) / m)
}

fn palette(t: f32) -> [f32; 3] {
    let channel = |offset: f32| 0.5 + 0.5 * (6.28318 * (t + offset)).cos();
    [channel(0.0), channel(0.33), channel(0.67)]
}

/// CPU evaluation of the fragment shader, RGB in [0, 1].
pub fn fractal_color(time: f32, frag: (f32, f32), resolution: (f32, f32)) -> [f32; 3] {
    let (mut x, mut y) = plane_coords(frag, resolution);
    let (cx, cy) = (0.8 + 0.1 * (time * 0.21).sin(), 0.55 + 0.1 * (time * 0.17).cos());
    let mut col = [0.0f32; 3];
    for i in 0..FOLD_ITERATIONS {
        let r2 = (x * x + y * y).max(1e-4);
        x = x.abs() / r2 - cx;
        y = y.abs() / r2 - cy;
        let d = (x * x + y * y).sqrt();
        let p = palette(d * 0.25 + i as f32 * 0.1 + time * 0.05);
        let fade = (-d).exp();
        for (c, p) in col.iter_mut().zip(p) {
            *c += p * fade;
        }
    }
    col.map(|c| c / FOLD_ITERATIONS as f32)
}

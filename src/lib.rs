//! Decorative page effects: shuffled background music with an audio-reactive
//! bar visualizer, a warp starfield, drifting glow orbs, pointer sparks and a
//! WebGL fractal backdrop.
//!
//! The animation state lives in platform-independent modules so it can be
//! exercised on the host; browser wiring is compiled only for `wasm32`.

pub mod audio;
pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod fractal;
pub mod frame;
pub mod layers;
pub mod playlist;

// Only compile browser-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::FxConfig;
pub use error::{FxError, FxResult};
pub use frame::{FrameInput, FramePump, Layer, LayerId, PointerSample, Viewport};

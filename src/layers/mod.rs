//! Canvas-2D animation layers. Each owns its surface and its state; they
//! only share the read-only [`FrameInput`](crate::frame::FrameInput).

pub mod bars;
pub mod orbs;
pub mod particles;
pub mod starfield;

pub use bars::BarsLayer;
pub use orbs::OrbLayer;
pub use particles::ParticleLayer;
pub use starfield::StarfieldLayer;

/// Uniform sample in `[lo, hi)`.
pub(crate) fn uniform(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.f64()
}

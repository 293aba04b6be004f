//! Audio-side state that does not touch the browser: the frequency source
//! seam, the one-shot unlock gate, the mute toggle and the playback logging
//! policy.

use crate::error::FxResult;

/// Anything that can produce a per-frame magnitude snapshot (0-255 per bin).
pub trait FrequencySource {
    fn bin_count(&self) -> usize;

    /// Overwrite `out` (of length [`bin_count`](Self::bin_count)) with the
    /// latest magnitudes.
    fn refresh(&mut self, out: &mut [u8]);
}

/// Source used when no analyser is available: every bin stays at zero.
#[derive(Debug, Clone)]
pub struct SilentSource {
    bins: usize,
}

impl SilentSource {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl FrequencySource for SilentSource {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn refresh(&mut self, out: &mut [u8]) {
        out.fill(0);
    }
}

/// Source that always reports the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticSource {
    data: Vec<u8>,
}

impl StaticSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn set(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

impl FrequencySource for StaticSource {
    fn bin_count(&self) -> usize {
        self.data.len()
    }

    fn refresh(&mut self, out: &mut [u8]) {
        let n = out.len().min(self.data.len());
        out[..n].copy_from_slice(&self.data[..n]);
        out[n..].fill(0);
    }
}

/// Browsers refuse to start audio before a user gesture; this gate lets the
/// first gesture through and ignores the rest.
#[derive(Debug, Default)]
pub struct UnlockGate {
    unlocked: bool,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once.
    pub fn try_unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        true
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

pub const MUTED_ICON: &str = "🔇";
pub const UNMUTED_ICON: &str = "🔊";

#[derive(Debug, Default)]
pub struct MuteToggle {
    muted: bool,
}

impl MuteToggle {
    pub fn new(muted: bool) -> Self {
        Self { muted }
    }

    /// Flip and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.muted = !self.muted;
        log::info!("music {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn indicator(&self) -> &'static str {
        if self.muted {
            MUTED_ICON
        } else {
            UNMUTED_ICON
        }
    }
}

/// Single policy for playback outcomes: failures are logged, never raised.
/// Returns whether playback succeeded.
pub fn report_playback(what: &str, outcome: FxResult<()>) -> bool {
    match outcome {
        Ok(()) => {
            log::debug!("{what} started");
            true
        }
        Err(e) => {
            log::warn!("{what} failed: {e}");
            false
        }
    }
}

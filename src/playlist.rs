//! Shuffled background-music playlist.

use crate::error::{FxError, FxResult};

#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<String>,
    current: usize,
    rng: fastrand::Rng,
}

impl Playlist {
    /// Start on a uniformly random track.
    pub fn new(tracks: Vec<String>, mut rng: fastrand::Rng) -> FxResult<Self> {
        if tracks.is_empty() {
            return Err(FxError::EmptyPlaylist);
        }
        let current = rng.usize(..tracks.len());
        Ok(Self { tracks, current, rng })
    }

    /// Start on a given track.
    pub fn starting_at(tracks: Vec<String>, current: usize, rng: fastrand::Rng) -> FxResult<Self> {
        if tracks.is_empty() {
            return Err(FxError::EmptyPlaylist);
        }
        if current >= tracks.len() {
            return Err(FxError::InvalidConfig(format!(
                "track index {current} out of range for {} tracks",
                tracks.len()
            )));
        }
        Ok(Self { tracks, current, rng })
    }

    pub fn current(&self) -> &str {
        &self.tracks[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Move to a uniformly random track other than the current one
    /// (a single-track playlist stays put) and return it.
    pub fn advance(&mut self) -> &str {
        let len = self.tracks.len();
        if len > 1 {
            // Draw from the other len - 1 slots, skipping over the current one.
            let pick = self.rng.usize(..len - 1);
            self.current = if pick >= self.current { pick + 1 } else { pick };
        }
        log::info!("next track: {}", self.current());
        self.current()
    }
}

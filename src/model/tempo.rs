//! Allowed tempos and the step period they imply.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TEMPO_OPTIONS: [u32; 4] = [97, 123, 138, 192];
pub const DEFAULT_BPM: u32 = 97;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TempoError {
    #[error("tempo {bpm} is not one of the allowed values {allowed:?}")]
    NotAllowed { bpm: u32, allowed: Vec<u32> },
    #[error("tempo options must not be empty")]
    NoOptions,
    #[error("tempo must be positive")]
    Zero,
}

/// The fixed, ordered set of tempos a user may pick from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct TempoOptions {
    values: Vec<u32>,
}

impl TempoOptions {
    pub fn new(mut values: Vec<u32>) -> Result<Self, TempoError> {
        if values.is_empty() {
            return Err(TempoError::NoOptions);
        }
        if values.contains(&0) {
            return Err(TempoError::Zero);
        }
        values.sort_unstable();
        values.dedup();
        Ok(Self { values })
    }

    pub fn contains(&self, bpm: u32) -> bool {
        self.values.binary_search(&bpm).is_ok()
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Option at `position` (0-based), as used by number-key selection.
    pub fn nth(&self, position: usize) -> Option<u32> {
        self.values.get(position).copied()
    }

    pub fn next_after(&self, bpm: u32) -> u32 {
        self.values
            .iter()
            .copied()
            .find(|v| *v > bpm)
            .unwrap_or(self.values[self.values.len() - 1])
    }

    pub fn prev_before(&self, bpm: u32) -> u32 {
        self.values
            .iter()
            .rev()
            .copied()
            .find(|v| *v < bpm)
            .unwrap_or(self.values[0])
    }

    /// Checks `bpm` against the set and wraps it as a `Tempo`.
    pub fn select(&self, bpm: u32) -> Result<Tempo, TempoError> {
        if self.contains(bpm) {
            Ok(Tempo(bpm))
        } else {
            Err(TempoError::NotAllowed { bpm, allowed: self.values.clone() })
        }
    }
}

impl Default for TempoOptions {
    fn default() -> Self {
        Self { values: DEFAULT_TEMPO_OPTIONS.to_vec() }
    }
}

impl TryFrom<Vec<u32>> for TempoOptions {
    type Error = TempoError;

    fn try_from(values: Vec<u32>) -> Result<Self, Self::Error> {
        TempoOptions::new(values)
    }
}

impl From<TempoOptions> for Vec<u32> {
    fn from(options: TempoOptions) -> Vec<u32> {
        options.values
    }
}

/// A tempo in beats per minute that was accepted by a `TempoOptions` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tempo(u32);

impl Default for Tempo {
    /// `DEFAULT_BPM`, a member of the default option set.
    fn default() -> Self {
        Tempo(DEFAULT_BPM)
    }
}

impl Tempo {
    pub fn bpm(self) -> u32 {
        self.0
    }

    /// Length of one step (a sixteenth note).
    pub fn step_period(self) -> Duration {
        crate::audio::timing::sixteenth(self.0)
    }
}

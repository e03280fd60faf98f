//! The sixteen-step pattern grid and its bounded step index.

use serde::{Deserialize, Serialize};

use super::track::{TrackId, TRACK_COUNT};

/// Steps per pattern; every track row always has exactly this many.
pub const STEPS: usize = 16;

/// A step position in `0..STEPS`. Out-of-range values cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StepIndex(u8);

impl StepIndex {
    pub const ZERO: StepIndex = StepIndex(0);

    pub fn new(step: usize) -> Option<Self> {
        (step < STEPS).then_some(StepIndex(step as u8))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// The following step, wrapping back to 0 after the last one.
    pub fn next(self) -> Self {
        StepIndex(((self.0 as usize + 1) % STEPS) as u8)
    }

    pub fn prev(self) -> Self {
        StepIndex(((self.0 as usize + STEPS - 1) % STEPS) as u8)
    }

    pub fn all() -> impl Iterator<Item = StepIndex> {
        (0..STEPS as u8).map(StepIndex)
    }
}

impl TryFrom<u8> for StepIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StepIndex::new(value as usize).ok_or_else(|| format!("step {} out of range 0..{}", value, STEPS))
    }
}

impl From<StepIndex> for u8 {
    fn from(step: StepIndex) -> u8 {
        step.0
    }
}

/// The boolean step matrix, one fixed-length row per track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    rows: [[bool; STEPS]; TRACK_COUNT],
}

impl Pattern {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_active(&self, track: TrackId, step: StepIndex) -> bool {
        self.rows[track.index()][step.get()]
    }

    pub fn set(&mut self, track: TrackId, step: StepIndex, active: bool) {
        self.rows[track.index()][step.get()] = active;
    }

    pub fn toggle(&mut self, track: TrackId, step: StepIndex) {
        let cell = &mut self.rows[track.index()][step.get()];
        *cell = !*cell;
    }

    pub fn clear(&mut self) {
        self.rows = [[false; STEPS]; TRACK_COUNT];
    }

    pub fn row(&self, track: TrackId) -> &[bool; STEPS] {
        &self.rows[track.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|on| !on)
    }

    /// Tracks with a hit at `step`, in grid order.
    pub fn active_at(&self, step: StepIndex) -> impl Iterator<Item = TrackId> + '_ {
        TrackId::ALL.into_iter().filter(move |t| self.is_active(*t, step))
    }

    /// Renders a row as `x` for hits and `.` for rests, in groups of four.
    pub fn row_string(&self, track: TrackId) -> String {
        let mut out = String::with_capacity(STEPS + STEPS / 4);
        for (i, on) in self.row(track).iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                out.push(' ');
            }
            out.push(if *on { 'x' } else { '.' });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(i: usize) -> StepIndex {
        StepIndex::new(i).unwrap()
    }

    #[test]
    fn step_index_is_bounded() {
        assert!(StepIndex::new(15).is_some());
        assert!(StepIndex::new(16).is_none());
        assert!(StepIndex::try_from(200u8).is_err());
    }

    #[test]
    fn step_index_wraps() {
        assert_eq!(step(15).next(), StepIndex::ZERO);
        assert_eq!(StepIndex::ZERO.prev(), step(15));
        assert_eq!(StepIndex::all().count(), STEPS);
    }

    #[test]
    fn active_at_lists_tracks_in_order() {
        let mut p = Pattern::empty();
        p.set(TrackId::Sample2, step(3), true);
        p.set(TrackId::Tone, step(3), true);
        let hits: Vec<TrackId> = p.active_at(step(3)).collect();
        assert_eq!(hits, vec![TrackId::Tone, TrackId::Sample2]);
        assert_eq!(p.active_at(step(4)).count(), 0);
    }

    #[test]
    fn row_string_groups_by_beat() {
        let mut p = Pattern::empty();
        for i in [0, 4, 8, 12] {
            p.set(TrackId::Tone, step(i), true);
        }
        assert_eq!(p.row_string(TrackId::Tone), "x... x... x... x...");
    }
}

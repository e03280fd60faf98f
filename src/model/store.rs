//! The pattern store: step matrix plus the selected tempo.
//!
//! Mutated only by user edit actions; the transport reads it on each tick.

use super::pattern::{Pattern, StepIndex};
use super::tempo::{Tempo, TempoError, TempoOptions};
use super::track::TrackId;

#[derive(Debug, Clone)]
pub struct PatternStore {
    pattern: Pattern,
    tempo: Tempo,
    options: TempoOptions,
}

impl PatternStore {
    /// Starts with an empty pattern at `bpm`, which must be one of `options`.
    pub fn new(options: TempoOptions, bpm: u32) -> Result<Self, TempoError> {
        let tempo = options.select(bpm)?;
        Ok(Self { pattern: Pattern::empty(), tempo, options })
    }

    pub fn toggle_step(&mut self, track: TrackId, step: StepIndex) {
        self.pattern.toggle(track, step);
    }

    pub fn is_active(&self, track: TrackId, step: StepIndex) -> bool {
        self.pattern.is_active(track, step)
    }

    /// Clears every step on every track.
    pub fn reset(&mut self) {
        self.pattern.clear();
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn tempo_options(&self) -> &TempoOptions {
        &self.options
    }

    /// Selects a new tempo. Values outside the allowed set are rejected and
    /// the current tempo is kept.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<Tempo, TempoError> {
        self.tempo = self.options.select(bpm)?;
        Ok(self.tempo)
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self { pattern: Pattern::empty(), tempo: Tempo::default(), options: TempoOptions::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_every_cell() {
        let mut store = PatternStore::default();
        store.toggle_step(TrackId::Sample1, StepIndex::new(5).unwrap());
        let before = store.pattern().clone();
        for track in TrackId::ALL {
            for step in StepIndex::all() {
                store.toggle_step(track, step);
                store.toggle_step(track, step);
            }
        }
        assert_eq!(store.pattern(), &before);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = PatternStore::default();
        for track in TrackId::ALL {
            for step in StepIndex::all().step_by(3) {
                store.toggle_step(track, step);
            }
        }
        store.reset();
        for track in TrackId::ALL {
            for step in StepIndex::all() {
                assert!(!store.is_active(track, step));
            }
        }
    }

    #[test]
    fn rejected_tempo_keeps_the_current_one() {
        let mut store = PatternStore::default();
        assert_eq!(store.tempo().bpm(), 97);
        assert!(store.set_tempo(100).is_err());
        assert_eq!(store.tempo().bpm(), 97);
        assert_eq!(store.set_tempo(138).map(Tempo::bpm), Ok(138));
    }

    #[test]
    fn new_requires_member_bpm() {
        assert!(PatternStore::new(TempoOptions::default(), 120).is_err());
        let options = TempoOptions::new(vec![120]).unwrap();
        assert_eq!(PatternStore::new(options, 120).unwrap().tempo().bpm(), 120);
    }
}

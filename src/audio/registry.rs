//! The sound registry: owns one sound source per track, tracks sample
//! loading, and exposes a single `trigger` entry point.
//!
//! Triggers never fail towards the caller. A sample that is still loading
//! (or failed to load) is skipped with a warning; a voice the output refuses
//! to start is logged and dropped.

use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::effects::Distortion;
use super::loader::{spawn_loads, LoadError, LoadResult, SampleLoader};
use super::output::{AudioOutput, BoxedSource, Voice};
use super::sources::{DecodedSample, Envelope, NoiseVoice, ToneVoice};
use super::timing::{db_to_amplitude, midi_note_to_frequency, BROWN_NOISE_LENGTH, TONE_NOTE, WHITE_NOISE_LENGTH};
use crate::console;
use crate::model::kit::{KitConfig, MixConfig};
use crate::model::track::{NoiseColor, TrackId, TrackKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundError {
    #[error("failed to load {track} from {locator}: {reason}")]
    AssetLoadFailed { track: TrackId, locator: String, reason: String },
    #[error("cannot start {track}: {reason}")]
    PlaybackStartFailed { track: TrackId, reason: String },
}

/// Loading status of one sample track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadState {
    Pending,
    Loaded,
    Failed(String),
}

impl AssetLoadState {
    pub fn label(&self) -> &str {
        match self {
            AssetLoadState::Pending => "loading",
            AssetLoadState::Loaded => "loaded",
            AssetLoadState::Failed(_) => "failed",
        }
    }
}

/// A one-shot sample slot. `sample` is `Some` exactly when the state is
/// `Loaded`; triggering is only allowed then.
pub struct SampleSlot {
    locator: String,
    state: AssetLoadState,
    sample: Option<DecodedSample>,
}

impl SampleSlot {
    fn new(locator: String) -> Self {
        Self { locator, state: AssetLoadState::Pending, sample: None }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn state(&self) -> &AssetLoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.sample.is_some()
    }

    pub fn sample(&self) -> Option<&DecodedSample> {
        self.sample.as_ref()
    }
}

/// A playable sound, one of the three source kinds.
pub enum SoundSource {
    SynthesizedTone { frequency: f32, envelope: Envelope, gain: f32 },
    NoiseGenerator { color: NoiseColor, length: Duration, gain: f32, seed: u32 },
    SampleOneShot(SampleSlot),
}

impl SoundSource {
    fn for_track(track: TrackId, kit: &KitConfig) -> Self {
        let mix = &kit.mix;
        match track.kind() {
            TrackKind::Tone => SoundSource::SynthesizedTone {
                frequency: midi_note_to_frequency(TONE_NOTE),
                envelope: Envelope::PLUCK,
                gain: db_to_amplitude(mix.tone_db),
            },
            TrackKind::Noise(color) => {
                let (length, db) = match color {
                    NoiseColor::White => (WHITE_NOISE_LENGTH, mix.white_noise_db),
                    NoiseColor::Brown => (BROWN_NOISE_LENGTH, mix.brown_noise_db),
                };
                SoundSource::NoiseGenerator { color, length, gain: db_to_amplitude(db), seed: 1 }
            }
            TrackKind::Sample => {
                let locator = kit.samples.get(&track).cloned().unwrap_or_default();
                let mut slot = SampleSlot::new(locator);
                if slot.locator.is_empty() {
                    slot.state = AssetLoadState::Failed("no sample configured".into());
                }
                SoundSource::SampleOneShot(slot)
            }
        }
    }
}

type LoadObserver = Box<dyn FnMut(TrackId, &AssetLoadState)>;

pub struct SoundRegistry {
    sources: BTreeMap<TrackId, SoundSource>,
    note_length: Duration,
    distortion: f32,
    samples_gain: f32,
    loads: Option<Receiver<LoadResult>>,
    observers: Vec<LoadObserver>,
}

impl SoundRegistry {
    /// Builds one source per track. Sample tracks start out `Pending`; call
    /// `begin_loading` to fetch them.
    pub fn new(kit: &KitConfig, note_length: Duration) -> Self {
        let sources = TrackId::ALL.into_iter().map(|t| (t, SoundSource::for_track(t, kit))).collect();
        Self::with_sources(sources, note_length, &kit.mix)
    }

    fn with_sources(sources: BTreeMap<TrackId, SoundSource>, note_length: Duration, mix: &MixConfig) -> Self {
        Self {
            sources,
            note_length,
            distortion: mix.distortion,
            samples_gain: db_to_amplitude(mix.samples_db),
            loads: None,
            observers: Vec::new(),
        }
    }

    /// Starts loading every pending sample in the background.
    pub fn begin_loading(&mut self, loader: Arc<dyn SampleLoader>) {
        let assets: Vec<(TrackId, String)> = self
            .sources
            .iter()
            .filter_map(|(t, s)| match s {
                SoundSource::SampleOneShot(slot) if slot.state == AssetLoadState::Pending => {
                    Some((*t, slot.locator.clone()))
                }
                _ => None,
            })
            .collect();
        if assets.is_empty() {
            return;
        }
        self.loads = Some(spawn_loads(loader, assets));
    }

    /// Applies any load results that have arrived. Returns how many were
    /// applied.
    pub fn poll_loads(&mut self) -> usize {
        let Some(rx) = self.loads.take() else {
            return 0;
        };
        let mut applied = 0;
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(done) => {
                    self.apply_load(done.track, done.result);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }
        if !finished {
            self.loads = Some(rx);
        }
        applied
    }

    /// Records the outcome of loading `track`'s sample.
    pub fn apply_load(&mut self, track: TrackId, result: Result<DecodedSample, LoadError>) {
        let Some(SoundSource::SampleOneShot(slot)) = self.sources.get_mut(&track) else {
            return;
        };
        match result {
            Ok(sample) => {
                console::info(format!("{} loaded from {}", track, slot.locator));
                slot.sample = Some(sample);
                slot.state = AssetLoadState::Loaded;
            }
            Err(e) => {
                let err = SoundError::AssetLoadFailed {
                    track,
                    locator: slot.locator.clone(),
                    reason: e.to_string(),
                };
                console::error(err.to_string());
                slot.sample = None;
                slot.state = AssetLoadState::Failed(e.to_string());
            }
        }
        let state = slot.state.clone();
        for observer in &mut self.observers {
            observer(track, &state);
        }
        if self.all_samples_loaded() {
            console::info("all samples loaded");
        }
    }

    /// Registers a callback for sample load-state changes.
    pub fn on_load_change(&mut self, observer: impl FnMut(TrackId, &AssetLoadState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn load_state(&self, track: TrackId) -> Option<&AssetLoadState> {
        match self.sources.get(&track)? {
            SoundSource::SampleOneShot(slot) => Some(slot.state()),
            _ => None,
        }
    }

    pub fn sample_slot(&self, track: TrackId) -> Option<&SampleSlot> {
        match self.sources.get(&track)? {
            SoundSource::SampleOneShot(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn all_samples_loaded(&self) -> bool {
        self.sources.values().all(|s| match s {
            SoundSource::SampleOneShot(slot) => slot.is_loaded(),
            _ => true,
        })
    }

    /// True while background loads started by `begin_loading` have not all
    /// reported back.
    pub fn loads_in_flight(&self) -> bool {
        self.loads.is_some()
    }

    /// Length of a tone note; follows the tempo.
    pub fn set_note_length(&mut self, note_length: Duration) {
        self.note_length = note_length;
    }

    pub fn note_length(&self) -> Duration {
        self.note_length
    }

    /// Plays `track`'s sound at `at` on the output clock. Never fails; all
    /// problems are logged here and the trigger is skipped.
    pub fn trigger(&mut self, track: TrackId, at: Duration, output: &mut dyn AudioOutput) {
        if let Err(e) = self.try_trigger(track, at, output) {
            console::error(e.to_string());
        }
    }

    fn try_trigger(&mut self, track: TrackId, at: Duration, output: &mut dyn AudioOutput) -> Result<(), SoundError> {
        let distortion = self.distortion;
        let Some(source) = self.sources.get_mut(&track) else {
            return Ok(());
        };
        let (raw, stop_at): (BoxedSource, Option<Duration>) = match source {
            SoundSource::SynthesizedTone { frequency, envelope, gain } => {
                (Box::new(ToneVoice::new(*frequency, self.note_length, *envelope, *gain)), None)
            }
            SoundSource::NoiseGenerator { color, length, gain, seed } => {
                *seed = seed.wrapping_add(0x9E37_79B9);
                (Box::new(NoiseVoice::new(*color, *seed, *gain)), Some(at + *length))
            }
            SoundSource::SampleOneShot(slot) => match &slot.sample {
                Some(sample) => (Box::new(sample.play(self.samples_gain)), None),
                None => {
                    // not ready: a missed beat, not an error
                    console::warn(format!(
                        "tried to play {} before {} finished loading ({})",
                        track,
                        slot.locator,
                        slot.state.label()
                    ));
                    return Ok(());
                }
            },
        };
        let voice = Voice { track, at, stop_at, source: Box::new(Distortion::new(raw, distortion)) };
        output
            .start(voice)
            .map_err(|e| SoundError::PlaybackStartFailed { track, reason: e.to_string() })
    }

    /// Drops every decoded sample and pending load. Synth sources stay.
    pub fn release(&mut self) {
        self.loads = None;
        self.observers.clear();
        for source in self.sources.values_mut() {
            if let SoundSource::SampleOneShot(slot) = source {
                slot.sample = None;
                if slot.state == AssetLoadState::Loaded {
                    slot.state = AssetLoadState::Pending;
                }
            }
        }
    }
}

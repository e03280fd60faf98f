//! The application shell: pattern, sounds, transport and the audio output,
//! driven cooperatively by the host loop through `pump`.

pub mod draw;
pub mod schedule;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audio::loader::SampleLoader;
use crate::audio::output::AudioOutput;
use crate::audio::registry::{AssetLoadState, SoundRegistry};
use crate::console;
use crate::model::kit::KitConfig;
use crate::model::pattern::{Pattern, StepIndex};
use crate::model::store::PatternStore;
use crate::model::tempo::{Tempo, TempoError, TempoOptions};
use crate::model::track::TrackId;

use self::draw::DrawQueue;
use self::schedule::Scheduler;
pub use self::transport::PlaybackState;
use self::transport::Transport;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    #[error(transparent)]
    Tempo(#[from] TempoError),
}

/// What the UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: PlaybackState,
    /// `start` was accepted and is waiting for sample loads to settle.
    pub start_pending: bool,
    /// Step to highlight; only set while running.
    pub highlight: Option<StepIndex>,
    pub bpm: u32,
    pub all_samples_loaded: bool,
}

pub struct Engine<O: AudioOutput> {
    store: PatternStore,
    registry: SoundRegistry,
    transport: Transport,
    scheduler: Scheduler,
    draw: DrawQueue,
    output: O,
    lookahead: Duration,
    start_pending: bool,
    shut_down: bool,
}

impl<O: AudioOutput> Engine<O> {
    /// Builds the engine from a kit. The output is not touched until the
    /// first `start`.
    pub fn new(kit: &KitConfig, output: O) -> Result<Self, EngineError> {
        let store = PatternStore::new(kit.tempo.options.clone(), kit.tempo.default)?;
        let registry = SoundRegistry::new(kit, store.tempo().step_period());
        Ok(Self {
            store,
            registry,
            transport: Transport::new(),
            scheduler: Scheduler::new(),
            draw: DrawQueue::new(),
            output,
            lookahead: kit.lookahead(),
            start_pending: false,
            shut_down: false,
        })
    }

    /// Starts background loading of the kit's samples. Results land during
    /// later `pump` calls.
    pub fn load_samples(&mut self, loader: Arc<dyn SampleLoader>) {
        self.registry.begin_loading(loader);
    }

    /// Calls `observer` whenever a sample finishes loading or fails.
    pub fn on_asset_change(&mut self, observer: impl FnMut(TrackId, &AssetLoadState) + 'static) {
        self.registry.on_load_change(observer);
    }

    pub fn toggle_step(&mut self, track: TrackId, step: StepIndex) {
        self.store.toggle_step(track, step);
    }

    pub fn is_active(&self, track: TrackId, step: StepIndex) -> bool {
        self.store.is_active(track, step)
    }

    /// Clears the pattern and rewinds the cursor. Playback keeps going from
    /// step 0 if it was running.
    pub fn reset(&mut self) {
        self.store.reset();
        self.transport.rewind();
        self.draw.clear();
    }

    /// Selects one of the allowed tempos. A running loop picks it up at the
    /// next tick boundary.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<Tempo, EngineError> {
        let tempo = self.store.set_tempo(bpm)?;
        self.registry.set_note_length(tempo.step_period());
        self.transport.retime(&mut self.scheduler, tempo.step_period());
        Ok(tempo)
    }

    pub fn tempo(&self) -> Tempo {
        self.store.tempo()
    }

    pub fn tempo_options(&self) -> &TempoOptions {
        self.store.tempo_options()
    }

    /// Activates the output and begins ticking from step 0, first tick now.
    /// Does nothing when already running.
    ///
    /// While samples are still loading in the background the start is
    /// deferred: the state stays `Stopped` and the first `pump` after every
    /// load has reported (loaded or failed) begins playback.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.transport.is_running() || self.start_pending {
            return Ok(());
        }
        if self.shut_down {
            return Err(EngineError::AudioUnavailable("engine has been shut down".into()));
        }
        self.output.activate().map_err(|e| EngineError::AudioUnavailable(e.to_string()))?;

        if self.registry.loads_in_flight() {
            self.start_pending = true;
            console::info("waiting for samples to load");
            return Ok(());
        }
        self.begin_playback();
        Ok(())
    }

    fn begin_playback(&mut self) {
        self.start_pending = false;
        let period = self.store.tempo().step_period();
        self.draw.clear();
        self.transport.start(&mut self.scheduler, self.output.now(), period);
        console::info(format!("playing at {} bpm", self.store.tempo().bpm()));
    }

    /// Stops the loop, or cancels a start still waiting for samples.
    pub fn stop(&mut self) {
        if self.start_pending {
            self.start_pending = false;
            console::info("start cancelled");
            return;
        }
        if !self.transport.is_running() {
            return;
        }
        self.transport.stop();
        self.draw.clear();
        console::info("stopped");
    }

    pub fn toggle_playback(&mut self) -> Result<PlaybackState, EngineError> {
        if self.transport.is_running() || self.start_pending {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.transport.state())
    }

    pub fn is_start_pending(&self) -> bool {
        self.start_pending
    }

    /// One turn of the host loop: applies finished sample loads, begins a
    /// deferred start once loading has settled, then fires every tick due
    /// within the look-ahead window. Returns the number of ticks fired.
    pub fn pump(&mut self) -> usize {
        self.registry.poll_loads();
        if self.start_pending && !self.registry.loads_in_flight() {
            self.begin_playback();
        }
        if !self.transport.is_running() {
            return 0;
        }
        let horizon = self.output.now() + self.lookahead;
        let mut fired = 0;
        while let Some(firing) = self.scheduler.next_due(horizon) {
            if !self.transport.owns(firing.task) {
                continue;
            }
            self.transport.tick(firing.at, &self.store, &mut self.registry, &mut self.output, &mut self.draw);
            fired += 1;
        }
        fired
    }

    /// Step to highlight on this frame. Drains the draw queue up to the
    /// output clock, so it trails the audio scheduling by the look-ahead.
    pub fn highlight(&mut self) -> Option<StepIndex> {
        if !self.transport.is_running() {
            return None;
        }
        Some(self.draw.drain_due(self.output.now()))
    }

    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            state: self.transport.state(),
            start_pending: self.start_pending,
            highlight: self.highlight(),
            bpm: self.store.tempo().bpm(),
            all_samples_loaded: self.registry.all_samples_loaded(),
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.transport.state()
    }

    /// The step the next tick will play.
    pub fn cursor(&self) -> StepIndex {
        self.transport.cursor()
    }

    pub fn pattern(&self) -> &Pattern {
        self.store.pattern()
    }

    pub fn all_samples_loaded(&self) -> bool {
        self.registry.all_samples_loaded()
    }

    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Stops the loop and releases every sound resource and the output.
    /// Safe to call more than once, and without ever having started.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.start_pending = false;
        self.transport.stop();
        self.draw.clear();
        self.registry.release();
        self.output.shutdown();
        self.shut_down = true;
    }
}

impl<O: AudioOutput> Drop for Engine<O> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

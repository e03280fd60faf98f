//! The boundary to the real audio device.
//!
//! Everything above this module schedules voices against the output's clock;
//! only `RodioOutput` knows about streams and sinks.

use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::model::track::TrackId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("audio output is not active")]
    Inactive,
    #[error("could not start voice: {0}")]
    Start(String),
}

pub type BoxedSource = Box<dyn Source<Item = f32> + Send>;

/// One sound to start at an exact time on the output clock.
pub struct Voice {
    pub track: TrackId,
    pub at: Duration,
    /// When set, the voice is cut off at this time.
    pub stop_at: Option<Duration>,
    pub source: BoxedSource,
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voice")
            .field("track", &self.track)
            .field("at", &self.at)
            .field("stop_at", &self.stop_at)
            .finish_non_exhaustive()
    }
}

pub trait AudioOutput {
    /// Opens the device. Until this succeeds nothing can be played; it stands
    /// in for the explicit user activation browsers require.
    fn activate(&mut self) -> Result<(), AudioError>;

    fn is_active(&self) -> bool;

    /// Current time on the output clock.
    fn now(&self) -> Duration;

    /// Queues `voice` to start at `voice.at`. Fire-and-forget: completion is
    /// never reported.
    fn start(&mut self, voice: Voice) -> Result<(), AudioError>;

    /// Silences everything and releases the device. Safe to call repeatedly.
    fn shutdown(&mut self);
}

/// `AudioOutput` backed by the default rodio output device. The device is
/// opened lazily by `activate`.
pub struct RodioOutput {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    epoch: Instant,
    sinks: Vec<Sink>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self { stream: None, epoch: Instant::now(), sinks: Vec::new() }
    }

    /// Number of voices still sounding or waiting to start.
    pub fn voices(&self) -> usize {
        self.sinks.iter().filter(|s| !s.empty()).count()
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RodioOutput {
    fn activate(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = OutputStream::try_default().map_err(|e| AudioError::Unavailable(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn start(&mut self, voice: Voice) -> Result<(), AudioError> {
        let Some((_, handle)) = &self.stream else {
            return Err(AudioError::Inactive);
        };
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Start(e.to_string()))?;

        let source: BoxedSource = match voice.stop_at {
            Some(stop) => Box::new(voice.source.take_duration(stop.saturating_sub(voice.at))),
            None => voice.source,
        };
        // Voices are queued ahead of the clock; pad with silence up to `at`.
        let lead = voice.at.saturating_sub(self.now());
        sink.append(source.delay(lead));
        sink.play();

        self.sinks.retain(|s| !s.empty());
        self.sinks.push(sink);
        Ok(())
    }

    fn shutdown(&mut self) {
        for sink in self.sinks.drain(..) {
            sink.stop();
        }
        self.stream = None;
    }
}

/// What `RecordingOutput` saw for one started voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedVoice {
    pub track: TrackId,
    pub at: Duration,
    pub stop_at: Option<Duration>,
}

/// A headless output with a manually driven clock. It records every voice it
/// is asked to start instead of playing it.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    now: Duration,
    active: bool,
    unavailable: bool,
    refuse_starts: bool,
    started: Vec<StartedVoice>,
    shutdowns: usize,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output whose activation always fails.
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    /// Makes every following `start` fail.
    pub fn refuse_starts(&mut self, refuse: bool) {
        self.refuse_starts = refuse;
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn started(&self) -> &[StartedVoice] {
        &self.started
    }

    pub fn started_for(&self, track: TrackId) -> Vec<StartedVoice> {
        self.started.iter().copied().filter(|v| v.track == track).collect()
    }

    pub fn clear(&mut self) {
        self.started.clear();
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns
    }
}

impl AudioOutput for RecordingOutput {
    fn activate(&mut self) -> Result<(), AudioError> {
        if self.unavailable {
            return Err(AudioError::Unavailable("no output device".into()));
        }
        self.active = true;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn start(&mut self, voice: Voice) -> Result<(), AudioError> {
        if !self.active {
            return Err(AudioError::Inactive);
        }
        if self.refuse_starts {
            return Err(AudioError::Start("voice rejected".into()));
        }
        self.started.push(StartedVoice { track: voice.track, at: voice.at, stop_at: voice.stop_at });
        Ok(())
    }

    fn shutdown(&mut self) {
        self.active = false;
        self.shutdowns += 1;
    }
}

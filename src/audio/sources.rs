//! The three kinds of sound the machine can make, as rodio sources.

use std::sync::Arc;
use std::time::Duration;

use rodio::Source;

use super::timing::{frames_for, SYNTH_SAMPLE_RATE};
use crate::model::track::NoiseColor;

/// Attack/decay/sustain/release shape for the tone voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: Duration,
    pub decay: Duration,
    pub sustain: f32,
    pub release: Duration,
}

impl Envelope {
    /// Short plucked envelope: fast attack, no sustain.
    pub const PLUCK: Envelope = Envelope {
        attack: Duration::from_millis(5),
        decay: Duration::from_millis(100),
        sustain: 0.0,
        release: Duration::from_millis(100),
    };

    /// Level while the note is held, `t` seconds after note-on.
    fn held_level(&self, t: f32) -> f32 {
        let a = self.attack.as_secs_f32();
        let d = self.decay.as_secs_f32();
        if t < a {
            t / a
        } else if t < a + d {
            1.0 - (1.0 - self.sustain) * (t - a) / d
        } else {
            self.sustain
        }
    }

    /// Level `t` seconds after note-on for a note released at `hold`.
    pub fn level(&self, t: f32, hold: f32) -> f32 {
        if t < hold {
            return self.held_level(t);
        }
        let r = self.release.as_secs_f32();
        if r <= 0.0 {
            return 0.0;
        }
        let from = self.held_level(hold);
        (from * (1.0 - (t - hold) / r)).max(0.0)
    }
}

/// An enveloped sine note of fixed length.
pub struct ToneVoice {
    phase: f32,
    phase_inc: f32,
    gain: f32,
    envelope: Envelope,
    hold: f32,
    frame: usize,
    total_frames: usize,
}

impl ToneVoice {
    pub fn new(frequency: f32, hold: Duration, envelope: Envelope, gain: f32) -> Self {
        let total = hold + envelope.release;
        Self {
            phase: 0.0,
            phase_inc: frequency / SYNTH_SAMPLE_RATE as f32,
            gain,
            envelope,
            hold: hold.as_secs_f32(),
            frame: 0,
            total_frames: frames_for(total, SYNTH_SAMPLE_RATE),
        }
    }
}

impl Iterator for ToneVoice {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.total_frames {
            return None;
        }
        let t = self.frame as f32 / SYNTH_SAMPLE_RATE as f32;
        let level = self.envelope.level(t, self.hold);
        let out = (self.phase * std::f32::consts::TAU).sin() * level * self.gain;
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.frame += 1;
        Some(out)
    }
}

impl Source for ToneVoice {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_frames - self.frame)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SYNTH_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(self.total_frames as f64 / SYNTH_SAMPLE_RATE as f64))
    }
}

/// An endless noise generator; the output decides when it stops.
pub struct NoiseVoice {
    color: NoiseColor,
    rng_state: u32,
    brown: f32,
    gain: f32,
}

impl NoiseVoice {
    pub fn new(color: NoiseColor, seed: u32, gain: f32) -> Self {
        Self { color, rng_state: seed.max(1), brown: 0.0, gain }
    }

    fn white(&mut self) -> f32 {
        self.rng_state = self.rng_state.wrapping_mul(1664525).wrapping_add(1013904223);
        (self.rng_state as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Iterator for NoiseVoice {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white = self.white();
        let out = match self.color {
            NoiseColor::White => white,
            NoiseColor::Brown => {
                // leaky integrator; 3.5 restores roughly unit level
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * 3.5
            }
        };
        Some(out * self.gain)
    }
}

impl Source for NoiseVoice {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SYNTH_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// A fully decoded sample, shared between every playback of it.
#[derive(Clone, Debug)]
pub struct DecodedSample {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<[f32]>,
}

impl DecodedSample {
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        Duration::from_secs_f64(frames as f64 / self.sample_rate.max(1) as f64)
    }

    pub fn play(&self, gain: f32) -> SamplePlayback {
        SamplePlayback { sample: self.clone(), pos: 0, gain }
    }
}

/// One start-to-finish playback of a `DecodedSample`.
pub struct SamplePlayback {
    sample: DecodedSample,
    pos: usize,
    gain: f32,
}

impl Iterator for SamplePlayback {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let s = self.sample.samples.get(self.pos).copied()?;
        self.pos += 1;
        Some(s * self.gain)
    }
}

impl Source for SamplePlayback {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.sample.samples.len() - self.pos)
    }

    fn channels(&self) -> u16 {
        self.sample.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.sample.duration())
    }
}

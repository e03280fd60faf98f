use std::fmt;

use serde::{Deserialize, Serialize};

/// The six fixed tracks of the machine, in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackId {
    Tone,
    NoiseWhite,
    NoiseBrown,
    #[serde(rename = "sample-1")]
    Sample1,
    #[serde(rename = "sample-2")]
    Sample2,
    #[serde(rename = "sample-3")]
    Sample3,
}

pub const TRACK_COUNT: usize = 6;

/// What kind of sound source drives a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Tone,
    Noise(NoiseColor),
    Sample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    White,
    Brown,
}

impl TrackId {
    pub const ALL: [TrackId; TRACK_COUNT] = [
        TrackId::Tone,
        TrackId::NoiseWhite,
        TrackId::NoiseBrown,
        TrackId::Sample1,
        TrackId::Sample2,
        TrackId::Sample3,
    ];

    pub const SAMPLES: [TrackId; 3] = [TrackId::Sample1, TrackId::Sample2, TrackId::Sample3];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> TrackKind {
        match self {
            TrackId::Tone => TrackKind::Tone,
            TrackId::NoiseWhite => TrackKind::Noise(NoiseColor::White),
            TrackId::NoiseBrown => TrackKind::Noise(NoiseColor::Brown),
            TrackId::Sample1 | TrackId::Sample2 | TrackId::Sample3 => TrackKind::Sample,
        }
    }

    pub fn is_sample(self) -> bool {
        matches!(self.kind(), TrackKind::Sample)
    }

    /// Stable identifier used in kit files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            TrackId::Tone => "tone",
            TrackId::NoiseWhite => "noise-white",
            TrackId::NoiseBrown => "noise-brown",
            TrackId::Sample1 => "sample-1",
            TrackId::Sample2 => "sample-2",
            TrackId::Sample3 => "sample-3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackId::Tone => "Sine Wave",
            TrackId::NoiseWhite => "White Noise",
            TrackId::NoiseBrown => "Brown Noise",
            TrackId::Sample1 => "Scream 1",
            TrackId::Sample2 => "Scream 2",
            TrackId::Sample3 => "Scream 3",
        }
    }

    /// Display colour as RGB, used by the grid for active steps.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            TrackId::Tone => (6, 182, 212),
            TrackId::NoiseWhite => (156, 163, 175),
            TrackId::NoiseBrown => (180, 83, 9),
            TrackId::Sample1 => (239, 68, 68),
            TrackId::Sample2 => (249, 115, 22),
            TrackId::Sample3 => (236, 72, 153),
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

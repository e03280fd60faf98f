//! Step timing and the unit conversions shared by the synth voices.

use std::time::Duration;

/// Sample rate used for everything synthesized in-process.
pub const SYNTH_SAMPLE_RATE: u32 = 44_100;

/// Pitch of the tone track (C4).
pub const TONE_NOTE: u8 = 60;

/// How long each noise colour sounds before its scheduled stop.
pub const WHITE_NOISE_LENGTH: Duration = Duration::from_millis(100);
pub const BROWN_NOISE_LENGTH: Duration = Duration::from_millis(150);

/// Length of one sixteenth note: a quarter of a beat.
///
/// Integer nanosecond arithmetic keeps the value identical on every call, so
/// tick times built by repeated addition stay exactly `n * sixteenth` apart.
pub fn sixteenth(bpm: u32) -> Duration {
    Duration::from_secs(15) / bpm.max(1)
}

pub fn db_to_amplitude(db: f32) -> f32 {
    (10.0_f32).powf(db / 20.0)
}

pub fn midi_note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Number of frames covering `duration` at `sample_rate`.
pub fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteenth_at_120_is_an_eighth_of_a_second() {
        assert_eq!(sixteenth(120), Duration::from_millis(125));
    }

    #[test]
    fn sixteenth_is_inversely_proportional_to_bpm() {
        let a = sixteenth(97).as_secs_f64() * 97.0;
        let b = sixteenth(192).as_secs_f64() * 192.0;
        assert!((a - 15.0).abs() < 1e-6);
        assert!((b - 15.0).abs() < 1e-6);
        assert!(sixteenth(192) < sixteenth(97));
    }

    #[test]
    fn db_conversion_basics() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(-20.0) - 0.1).abs() < 1e-6);
        assert!(db_to_amplitude(-12.0) < db_to_amplitude(-6.0));
    }

    #[test]
    fn c4_frequency() {
        assert!((midi_note_to_frequency(TONE_NOTE) - 261.626).abs() < 0.01);
        assert!((midi_note_to_frequency(69) - 440.0).abs() < 1e-3);
    }

    #[test]
    fn brown_noise_rings_longer_than_white() {
        assert!(BROWN_NOISE_LENGTH > WHITE_NOISE_LENGTH);
        assert_eq!(frames_for(WHITE_NOISE_LENGTH, SYNTH_SAMPLE_RATE), 4410);
    }
}

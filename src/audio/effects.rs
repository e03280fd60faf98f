//! Audio effects applied to every voice before it reaches the output.

use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// A static waveshaping distortion that wraps a Source.
///
/// Uses the classic `(3 + k) * x * 20deg / (pi + k|x|)` curve with
/// `k = amount * 100`. At 0.8 quiet signals get roughly 9x gain and loud
/// ones flatten towards a third of full scale.
pub struct Distortion<S: Source<Item = f32>> {
    source: S,
    k: f32,
}

impl<S: Source<Item = f32>> Distortion<S> {
    /// Create a new distortion.
    /// - `source`: The audio source to shape
    /// - `amount`: Drive, clamped to 0.0 - 1.0
    pub fn new(source: S, amount: f32) -> Self {
        let k = amount.clamp(0.0, 1.0) * 100.0;
        Self { source, k }
    }

    fn shape(&self, x: f32) -> f32 {
        if x.abs() < 0.001 {
            return 0.0;
        }
        let deg = PI / 180.0;
        ((3.0 + self.k) * x * 20.0 * deg) / (PI + self.k * x.abs())
    }
}

impl<S: Source<Item = f32>> Iterator for Distortion<S> {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.source.next()?;
        Some(self.shape(input.clamp(-1.0, 1.0)))
    }
}

impl<S: Source<Item = f32>> Source for Distortion<S> {
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.source.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::source::SineWave;

    #[test]
    fn preserves_channels_and_sample_rate() {
        let shaped = Distortion::new(SineWave::new(440.0), 0.8);
        assert_eq!(shaped.channels(), 1);
        assert_eq!(shaped.sample_rate(), 48000);
    }

    #[test]
    fn curve_is_odd_and_bounded() {
        let shaped = Distortion::new(SineWave::new(440.0), 0.8);
        for x in [0.1f32, 0.5, 1.0] {
            let y = shaped.shape(x);
            assert!((shaped.shape(-x) + y).abs() < 1e-6);
            assert!(y > 0.0 && y <= 1.0);
        }
        assert_eq!(shaped.shape(0.0), 0.0);
    }

    #[test]
    fn more_drive_pushes_quiet_signals_harder() {
        let soft = Distortion::new(SineWave::new(440.0), 0.1);
        let hard = Distortion::new(SineWave::new(440.0), 0.8);
        assert!(hard.shape(0.1) > soft.shape(0.1));
    }

    #[test]
    fn default_drive_amplifies_quiet_input_and_gates_silence() {
        let shaped = Distortion::new(SineWave::new(440.0), 0.8);
        let gain = shaped.shape(0.01) / 0.01;
        assert!(gain > 6.0 && gain < 10.0, "gain {gain}");
        // full scale flattens to about a third
        assert!((shaped.shape(1.0) - 0.349).abs() < 0.01);
        assert_eq!(shaped.shape(0.0005), 0.0);
    }
}

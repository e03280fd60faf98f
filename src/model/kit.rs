use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::tempo::{TempoError, TempoOptions, DEFAULT_BPM};
use super::track::TrackId;

/// Everything the machine needs at startup: tempo choices, sample locators
/// and mix levels. Loaded from a YAML kit file or built from defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub tempo: TempoConfig,
    pub samples: BTreeMap<TrackId, String>,
    /// How far ahead of the audio clock ticks are queued.
    pub lookahead_ms: u64,
    pub mix: MixConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub options: TempoOptions,
    pub default: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub tone_db: f32,
    pub white_noise_db: f32,
    pub brown_noise_db: f32,
    pub samples_db: f32,
    /// Waveshaper amount applied to every voice, 0..1.
    pub distortion: f32,
}

impl Default for KitConfig {
    fn default() -> Self {
        let samples = [
            (TrackId::Sample1, "assets/screams/scream.wav"),
            (TrackId::Sample2, "assets/screams/scream2.wav"),
            (TrackId::Sample3, "assets/screams/scream3.wav"),
        ]
        .into_iter()
        .map(|(t, p)| (t, p.to_string()))
        .collect();
        Self {
            tempo: TempoConfig::default(),
            samples,
            lookahead_ms: 100,
            mix: MixConfig::default(),
        }
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self { options: TempoOptions::default(), default: DEFAULT_BPM }
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            tone_db: -12.0,
            white_noise_db: -15.0,
            brown_noise_db: -15.0,
            samples_db: 0.0,
            distortion: 0.8,
        }
    }
}

impl KitConfig {
    pub fn lookahead(&self) -> Duration {
        Duration::from_millis(self.lookahead_ms)
    }

    /// Sample tracks paired with their asset locators, in grid order.
    /// Sample tracks without a locator are left out.
    pub fn sample_assets(&self) -> Vec<(TrackId, String)> {
        TrackId::SAMPLES
            .into_iter()
            .filter_map(|t| self.samples.get(&t).map(|loc| (t, loc.clone())))
            .collect()
    }

    pub fn tempo_line(&self) -> String {
        format!(
            "tempo {} bpm (options {:?}), lookahead {} ms",
            self.tempo.default,
            self.tempo.options.values(),
            self.lookahead_ms
        )
    }

    /// Human-readable overview: the tempo line, then one line per track
    /// with its label and where its sound comes from.
    pub fn summary(&self) -> String {
        let mut out = self.tempo_line();
        out.push('\n');
        for track in TrackId::ALL {
            let source = match self.samples.get(&track) {
                Some(locator) => locator.as_str(),
                None if track.is_sample() => "[no sample]",
                None => "[synth]",
            };
            out.push_str(&format!("{:<12} {}\n", track.label(), source));
        }
        out
    }

    /// Checks the cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<(), TempoError> {
        self.tempo.options.select(self.tempo.default).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kit_validates() {
        let kit = KitConfig::default();
        assert!(kit.validate().is_ok());
        assert_eq!(kit.sample_assets().len(), 3);
        assert_eq!(kit.lookahead(), Duration::from_millis(100));
    }

    #[test]
    fn default_bpm_must_be_an_option() {
        let mut kit = KitConfig::default();
        kit.tempo.default = 120;
        assert!(kit.validate().is_err());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "tempo:\n  options: [100, 120]\n  default: 120\n";
        let kit: KitConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(kit.tempo.options.values(), &[100, 120]);
        assert_eq!(kit.samples.len(), 3);
        assert_eq!(kit.mix, MixConfig::default());
    }

    #[test]
    fn empty_tempo_options_are_rejected_at_parse_time() {
        let yaml = "tempo:\n  options: []\n";
        assert!(serde_yaml::from_str::<KitConfig>(yaml).is_err());
    }

    #[test]
    fn summary_lists_every_track() {
        let summary = KitConfig::default().summary();
        for t in TrackId::ALL {
            assert!(summary.contains(t.label()));
        }
        assert!(summary.contains("scream2.wav"));
    }

    #[test]
    fn summary_marks_synths_and_missing_samples() {
        let mut kit = KitConfig::default();
        kit.samples.remove(&TrackId::Sample3);
        let summary = kit.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 1 + TrackId::ALL.len());
        assert!(lines[0].starts_with("tempo 97 bpm"));
        assert!(lines[1].starts_with(TrackId::Tone.label()) && lines[1].ends_with("[synth]"));
        assert!(lines[6].ends_with("[no sample]"));
    }
}

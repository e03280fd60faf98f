//! Asset loading: turning sample locators into decoded audio, off the host
//! thread.

use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use rodio::{Decoder, Source};
use thiserror::Error;

use super::sources::DecodedSample;
use crate::model::track::TrackId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cannot read {locator}: {reason}")]
    Io { locator: String, reason: String },
    #[error("cannot decode {locator}: {reason}")]
    Decode { locator: String, reason: String },
    #[error("{locator} contains no audio")]
    Empty { locator: String },
}

/// Resolves an asset locator to decoded audio. Implementations may block;
/// they are only ever called from loader threads.
pub trait SampleLoader: Send + Sync + 'static {
    fn load(&self, locator: &str) -> Result<DecodedSample, LoadError>;
}

/// Loads WAV/MP3 files from disk, relative locators resolved against `root`.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        match &self.root {
            Some(root) if PathBuf::from(locator).is_relative() => root.join(locator),
            _ => PathBuf::from(locator),
        }
    }
}

impl SampleLoader for FileLoader {
    fn load(&self, locator: &str) -> Result<DecodedSample, LoadError> {
        let bytes = std::fs::read(self.resolve(locator)).map_err(|e| LoadError::Io {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;
        decode(locator, bytes)
    }
}

/// Decodes an in-memory audio file into interleaved f32 frames.
pub fn decode(locator: &str, bytes: Vec<u8>) -> Result<DecodedSample, LoadError> {
    let reader = BufReader::new(Cursor::new(bytes));
    let decoder = Decoder::new(reader).map_err(|e| LoadError::Decode {
        locator: locator.to_string(),
        reason: e.to_string(),
    })?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();
    if samples.is_empty() {
        return Err(LoadError::Empty { locator: locator.to_string() });
    }
    Ok(DecodedSample { channels, sample_rate, samples: samples.into() })
}

/// Outcome of one background load, delivered back to the host thread.
#[derive(Debug)]
pub struct LoadResult {
    pub track: TrackId,
    pub locator: String,
    pub result: Result<DecodedSample, LoadError>,
}

/// Starts one loader thread per asset. Results arrive on the returned channel
/// in completion order; the channel closes once every load has reported.
pub fn spawn_loads(loader: Arc<dyn SampleLoader>, assets: Vec<(TrackId, String)>) -> Receiver<LoadResult> {
    let (tx, rx) = mpsc::channel();
    for (track, locator) in assets {
        let tx = tx.clone();
        let loader = Arc::clone(&loader);
        std::thread::spawn(move || {
            let result = loader.load(&locator);
            let _ = tx.send(LoadResult { track, locator, result });
        });
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixed;

    impl SampleLoader for Fixed {
        fn load(&self, locator: &str) -> Result<DecodedSample, LoadError> {
            if locator.starts_with("bad") {
                return Err(LoadError::Empty { locator: locator.to_string() });
            }
            Ok(DecodedSample { channels: 1, sample_rate: 8000, samples: vec![0.0; 8].into() })
        }
    }

    #[test]
    fn spawn_loads_reports_every_asset() {
        let rx = spawn_loads(
            Arc::new(Fixed),
            vec![(TrackId::Sample1, "good.wav".into()), (TrackId::Sample2, "bad.wav".into())],
        );
        let mut results: Vec<LoadResult> = Vec::new();
        while let Ok(r) = rx.recv_timeout(Duration::from_secs(5)) {
            results.push(r);
        }
        results.sort_by_key(|r| r.track);
        assert_eq!(results.len(), 2);
        assert!(results[0].result.is_ok());
        assert!(matches!(results[1].result, Err(LoadError::Empty { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FileLoader::new().load("definitely/not/here.wav").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    fn wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn decodes_pcm_wav() {
        let bytes = wav_bytes(&[0, 16384, -16384, 32767], 22050);
        let sample = decode("tiny.wav", bytes).expect("decode");
        assert_eq!(sample.channels, 1);
        assert_eq!(sample.sample_rate, 22050);
        assert_eq!(sample.samples.len(), 4);
        assert!((sample.samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn file_loader_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("hit.wav"), wav_bytes(&[100; 32], 8000)).expect("write");
        let sample = FileLoader::with_root(dir.path()).load("hit.wav").expect("load");
        assert_eq!(sample.samples.len(), 32);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode("noise.bin", vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn relative_locators_resolve_against_root() {
        let loader = FileLoader::with_root("/kits/screams");
        assert_eq!(loader.resolve("a.wav"), PathBuf::from("/kits/screams/a.wav"));
        assert_eq!(loader.resolve("/abs/b.wav"), PathBuf::from("/abs/b.wav"));
    }
}

//! Sound production: synthesized and sampled sources, the registry that
//! triggers them, and the output device boundary.

pub mod effects;
pub mod loader;
pub mod output;
pub mod registry;
pub mod sources;
pub mod timing;

pub use loader::{FileLoader, LoadError, SampleLoader};
pub use output::{AudioError, AudioOutput, RecordingOutput, RodioOutput, Voice};
pub use registry::{AssetLoadState, SoundError, SoundRegistry, SoundSource};

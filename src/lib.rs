//! A sixteen-step drum machine: six tracks (a tone, two noise colors and
//! three one-shot samples) looped by a look-ahead transport.

pub mod audio;
pub mod console;
pub mod engine;
pub mod model;
pub mod storage;
pub mod tui;

pub mod kit;
pub mod pattern;
pub mod store;
pub mod tempo;
pub mod track;

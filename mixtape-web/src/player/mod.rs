//! Playback session state machine
//!
//! Owns "what is currently loaded, is it playing, at what position/volume"
//! and the transport operations that mutate it, decoupled from rendering.

pub mod engine;

pub use engine::{CurrentTrack, Player, PlayerState};

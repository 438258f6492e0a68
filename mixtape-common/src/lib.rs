//! # Mixtape Common Library
//!
//! Shared code for the mixtape music-library service:
//! - Domain models (Song, Playlist)
//! - Event types (MixtapeEvent enum)
//! - Error taxonomy
//! - Configuration loading
//! - Duration formatting

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, MixtapeEvent};
pub use models::{Playlist, Song};

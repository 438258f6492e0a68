//! Mixtape web service library
//!
//! REST + SSE backend for a personal music library: uploads and catalogs
//! songs, manages playlists of denormalized song snapshots, and owns the
//! playback session state machine the browser view renders from.

pub mod api;
pub mod db;
pub mod library;
pub mod metadata;
pub mod player;
pub mod storage;

pub use mixtape_common::{Error, Result};

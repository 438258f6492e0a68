//! HTTP API
//!
//! REST routes for the catalog, intent routes for the playback session, an
//! SSE event stream, and static serving of the uploaded audio files.

pub mod handlers;
pub mod player;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};

//! Database layer
//!
//! SQLite persistence for the song and playlist tables. Playlist entries are
//! denormalized snapshot rows; the song columns there are copies kept
//! consistent by the library's cascade rules, not foreign keys.

pub mod init;
pub mod playlists;
pub mod songs;

pub use init::{create_schema, init_database};

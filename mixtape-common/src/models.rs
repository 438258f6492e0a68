//! Domain models
//!
//! A `Playlist` embeds denormalized `Song` snapshots: copies of the song
//! fields at add time, not live references. Edit/delete cascades in the
//! library keep the copies consistent with the song table.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default owner label for playlists created without one
pub const DEFAULT_PLAYLIST_ARTIST: &str = "Your Playlist";

/// An uploaded audio track
///
/// `id`, `duration` and `url` are immutable after creation; edits touch
/// title/artist only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    /// Formatted `m:ss`, computed from the decoded audio metadata at upload
    pub duration: String,
    /// Locator of the audio bytes under the static route, e.g. `/audio/<file>`
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// Create a new song with a fresh id
    pub fn new(title: String, artist: String, duration: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            artist,
            duration,
            url,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive title+artist match, used for duplicate-upload detection
    pub fn matches(&self, title: &str, artist: &str) -> bool {
        self.title.eq_ignore_ascii_case(title) && self.artist.eq_ignore_ascii_case(artist)
    }
}

/// A named, ordered collection of denormalized song snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    /// Free-text owner label, not a foreign key
    pub artist: String,
    /// Creation year
    pub year: i32,
    pub songs: Vec<Song>,
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create an empty playlist with a fresh id
    pub fn new(name: String, artist: Option<String>) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            artist: artist.unwrap_or_else(|| DEFAULT_PLAYLIST_ARTIST.to_string()),
            year: created_at.year(),
            songs: Vec::new(),
            created_at,
        }
    }

    /// Whether the playlist already holds a snapshot of this song id
    pub fn contains_song(&self, song_id: Uuid) -> bool {
        self.songs.iter().any(|s| s.id == song_id)
    }
}

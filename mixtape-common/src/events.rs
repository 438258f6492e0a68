//! Event types for the mixtape event system
//!
//! Every library or player mutation broadcasts one of these; the SSE endpoint
//! streams them to connected views, which re-render (and drive their audio
//! element) from the payloads.

use crate::models::{Playlist, Song};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Mixtape event types
///
/// Serialized for SSE transmission; `type` carries the variant name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MixtapeEvent {
    /// A song was uploaded into the library
    SongAdded {
        song: Song,
        timestamp: DateTime<Utc>,
    },

    /// A song's title/artist changed; playlist snapshots were refreshed too
    SongUpdated {
        song: Song,
        timestamp: DateTime<Utc>,
    },

    /// A song was removed from the library and from every playlist
    SongDeleted {
        song_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A playlist was created
    PlaylistCreated {
        playlist: Playlist,
        timestamp: DateTime<Utc>,
    },

    /// A playlist's metadata or song list changed
    PlaylistUpdated {
        playlist: Playlist,
        timestamp: DateTime<Utc>,
    },

    /// A playlist was deleted (its songs survive in the library)
    PlaylistDeleted {
        playlist_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A new track was loaded into the player
    ///
    /// The attached view must replace its audio source; at most one source is
    /// active at a time.
    TrackLoaded {
        song: Song,
        /// Playlist the track was launched from, when any
        playlist_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
    },

    /// Playing flag flipped (the view starts or pauses its audio element)
    PlaybackStateChanged {
        playing: bool,
        timestamp: DateTime<Utc>,
    },

    /// Seek happened; position in seconds within the current track
    PositionChanged {
        position_secs: f64,
        timestamp: DateTime<Utc>,
    },

    /// Volume or mute state changed
    VolumeChanged {
        volume: f32,
        muted: bool,
        timestamp: DateTime<Utc>,
    },

    /// The player session was reset to empty (the view unloads its source)
    PlayerCleared { timestamp: DateTime<Utc> },
}

/// Broadcast bus shared by the library, the player, and the SSE endpoint
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MixtapeEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` undelivered events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast an event to all listeners
    pub fn emit(&self, event: MixtapeEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<MixtapeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

//! Playback engine
//!
//! Two states: empty (no current track) and loaded. Every transition
//! broadcasts an event; the attached view applies it to its audio element, so
//! loading a track implicitly releases the previously attached source.
//!
//! The active sequence is the ordered list skip operations walk. The library
//! keeps it current while songs are edited or deleted; skip locates the
//! current track by id and silently stays put when the id has vanished.

use chrono::Utc;
use mixtape_common::models::Song;
use mixtape_common::time::parse_duration;
use mixtape_common::{EventBus, MixtapeEvent};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Default volume for a fresh session
const DEFAULT_VOLUME: f32 = 0.75;

/// Currently loaded track plus the playlist context it was launched from
#[derive(Debug, Clone)]
pub struct CurrentTrack {
    pub song: Song,
    /// Set when the track was selected from within a playlist; skip and
    /// cleanup rules only apply to the same context
    pub playlist_id: Option<Uuid>,
}

/// Ephemeral transport state; never persisted
#[derive(Debug)]
struct Session {
    current: Option<CurrentTrack>,
    playing: bool,
    position_secs: f64,
    volume: f32,
    muted: bool,
    pre_mute_volume: f32,
    sequence: Vec<Song>,
}

impl Session {
    fn new() -> Self {
        Self {
            current: None,
            playing: false,
            position_secs: 0.0,
            volume: DEFAULT_VOLUME,
            muted: false,
            pre_mute_volume: DEFAULT_VOLUME,
            sequence: Vec::new(),
        }
    }

    /// Clear track state; volume and mute are device state and survive
    fn clear(&mut self) {
        self.current = None;
        self.playing = false;
        self.position_secs = 0.0;
        self.sequence.clear();
    }

    fn load(&mut self, song: Song, playlist_id: Option<Uuid>) {
        self.current = Some(CurrentTrack { song, playlist_id });
        self.playing = true;
        self.position_secs = 0.0;
    }

    /// Duration of the current track in seconds; unknown counts as 0
    fn duration_secs(&self) -> f64 {
        self.current
            .as_ref()
            .and_then(|c| parse_duration(&c.song.duration))
            .unwrap_or(0.0)
    }
}

/// Serializable snapshot of the session, returned by every player endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PlayerState {
    pub song: Option<Song>,
    pub playlist_id: Option<Uuid>,
    pub playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f32,
    pub muted: bool,
    pub sequence_len: usize,
}

/// The playback engine
pub struct Player {
    session: RwLock<Session>,
    events: EventBus,
}

impl Player {
    pub fn new(events: EventBus) -> Self {
        Self {
            session: RwLock::new(Session::new()),
            events,
        }
    }

    /// Snapshot the session
    pub async fn state(&self) -> PlayerState {
        let s = self.session.read().await;
        PlayerState {
            song: s.current.as_ref().map(|c| c.song.clone()),
            playlist_id: s.current.as_ref().and_then(|c| c.playlist_id),
            playing: s.playing,
            position_secs: s.position_secs,
            duration_secs: s.duration_secs(),
            volume: s.volume,
            muted: s.muted,
            sequence_len: s.sequence.len(),
        }
    }

    /// Load a track and start playing it
    ///
    /// `sequence` is the ordered list skip operations will use: the whole
    /// library, or the launching playlist's snapshots (then `playlist_id`
    /// tags the context).
    pub async fn select(&self, song: Song, sequence: Vec<Song>, playlist_id: Option<Uuid>) {
        info!("Loading track \"{}\" ({})", song.title, song.id);
        let mut s = self.session.write().await;
        s.sequence = sequence;
        s.load(song.clone(), playlist_id);
        drop(s);

        self.events.emit(MixtapeEvent::TrackLoaded {
            song,
            playlist_id,
            timestamp: Utc::now(),
        });
        self.events.emit(MixtapeEvent::PlaybackStateChanged {
            playing: true,
            timestamp: Utc::now(),
        });
    }

    /// Flip play/pause; no-op when nothing is loaded
    pub async fn toggle(&self) {
        let mut s = self.session.write().await;
        if s.current.is_none() {
            return;
        }
        s.playing = !s.playing;
        let playing = s.playing;
        drop(s);

        self.events.emit(MixtapeEvent::PlaybackStateChanged {
            playing,
            timestamp: Utc::now(),
        });
    }

    /// Skip to the next track in the active sequence (wraps around)
    pub async fn next(&self) {
        self.step(1).await;
    }

    /// Skip to the previous track in the active sequence (wraps around)
    pub async fn previous(&self) {
        self.step(-1).await;
    }

    /// The audio subsystem finished the current track; advance like `next`,
    /// against the current sequence
    pub async fn on_ended(&self) {
        debug!("Track ended, auto-advancing");
        self.step(1).await;
    }

    async fn step(&self, delta: i64) {
        let mut s = self.session.write().await;
        let Some(current) = &s.current else {
            return;
        };
        if s.sequence.is_empty() {
            return;
        }

        let current_id = current.song.id;
        let playlist_id = current.playlist_id;

        // First matching index; a song that has vanished from the sequence
        // leaves us where we are
        let Some(index) = s.sequence.iter().position(|t| t.id == current_id) else {
            debug!("Current track not in active sequence, staying put");
            return;
        };

        let len = s.sequence.len() as i64;
        let next_index = ((index as i64 + delta).rem_euclid(len)) as usize;
        let song = s.sequence[next_index].clone();
        s.load(song.clone(), playlist_id);
        drop(s);

        self.events.emit(MixtapeEvent::TrackLoaded {
            song,
            playlist_id,
            timestamp: Utc::now(),
        });
        self.events.emit(MixtapeEvent::PlaybackStateChanged {
            playing: true,
            timestamp: Utc::now(),
        });
    }

    /// Seek within the current track; clamps to `[0, duration]` and leaves
    /// the playing flag alone
    pub async fn seek(&self, position_secs: f64) {
        let mut s = self.session.write().await;
        if s.current.is_none() {
            return;
        }
        let duration = s.duration_secs();
        let clamped = if position_secs.is_finite() {
            position_secs.clamp(0.0, duration)
        } else {
            0.0
        };
        s.position_secs = clamped;
        drop(s);

        self.events.emit(MixtapeEvent::PositionChanged {
            position_secs: clamped,
            timestamp: Utc::now(),
        });
    }

    /// Set volume (clamped to 0.0-1.0); any audible volume clears mute
    pub async fn set_volume(&self, volume: f32) {
        let mut s = self.session.write().await;
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        s.volume = volume;
        if volume > 0.0 {
            s.muted = false;
        }
        let muted = s.muted;
        drop(s);

        self.events.emit(MixtapeEvent::VolumeChanged {
            volume,
            muted,
            timestamp: Utc::now(),
        });
    }

    /// Mute remembers the volume; unmute restores it exactly
    pub async fn toggle_mute(&self) {
        let mut s = self.session.write().await;
        if s.muted {
            s.volume = s.pre_mute_volume;
            s.muted = false;
        } else {
            s.pre_mute_volume = s.volume;
            s.volume = 0.0;
            s.muted = true;
        }
        let (volume, muted) = (s.volume, s.muted);
        drop(s);

        self.events.emit(MixtapeEvent::VolumeChanged {
            volume,
            muted,
            timestamp: Utc::now(),
        });
    }

    /// Force the session back to empty
    pub async fn reset(&self) {
        let mut s = self.session.write().await;
        s.clear();
        drop(s);

        self.events.emit(MixtapeEvent::PlayerCleared {
            timestamp: Utc::now(),
        });
    }

    /// The view navigated away from a playlist page; reset only when the
    /// current track was launched from that playlist
    pub async fn release_context(&self, playlist_id: Uuid) {
        let mut s = self.session.write().await;
        let owns_current = s
            .current
            .as_ref()
            .is_some_and(|c| c.playlist_id == Some(playlist_id));
        if !owns_current {
            return;
        }
        s.clear();
        drop(s);

        self.events.emit(MixtapeEvent::PlayerCleared {
            timestamp: Utc::now(),
        });
    }

    /// Library cascade: a song was deleted
    ///
    /// Halts the session when it was the current track; otherwise just purges
    /// it from the active sequence so skips cannot land on it.
    pub async fn handle_song_deleted(&self, song_id: Uuid) {
        let mut s = self.session.write().await;
        s.sequence.retain(|t| t.id != song_id);
        let was_current = s.current.as_ref().is_some_and(|c| c.song.id == song_id);
        if !was_current {
            return;
        }
        s.clear();
        drop(s);

        self.events.emit(MixtapeEvent::PlayerCleared {
            timestamp: Utc::now(),
        });
    }

    /// Library cascade: a song's title/artist changed; refresh the session's
    /// snapshots of it
    pub async fn handle_song_edited(&self, song: &Song) {
        let mut s = self.session.write().await;
        for track in s.sequence.iter_mut().filter(|t| t.id == song.id) {
            track.title = song.title.clone();
            track.artist = song.artist.clone();
        }
        if let Some(current) = s.current.as_mut().filter(|c| c.song.id == song.id) {
            current.song.title = song.title.clone();
            current.song.artist = song.artist.clone();
        }
    }

    /// Library cascade: the launching playlist was deleted
    ///
    /// The active sequence is stale; treat it as empty from now on (skips
    /// degrade to no-ops) but let the current track keep playing.
    pub async fn handle_playlist_deleted(&self, playlist_id: Uuid) {
        let mut s = self.session.write().await;
        let from_context = s
            .current
            .as_ref()
            .is_some_and(|c| c.playlist_id == Some(playlist_id));
        if from_context {
            s.sequence.clear();
        }
    }
}

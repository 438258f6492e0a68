//! Library state
//!
//! Single source of truth for the session: in-memory song and playlist
//! tables loaded from the database at startup, with the consistency rules
//! that keep them mutually valid. Every mutation writes through to the
//! database first, then updates the caches, cascades into playlist snapshots
//! and the playback session where required, and broadcasts an event.

use crate::db::{playlists as playlist_db, songs as song_db};
use crate::metadata;
use crate::player::Player;
use crate::storage::AudioStore;
use chrono::Utc;
use mixtape_common::models::{Playlist, Song};
use mixtape_common::time::format_duration;
use mixtape_common::{Error, EventBus, MixtapeEvent, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// The library: song and playlist tables plus their consistency rules
pub struct Library {
    db: SqlitePool,
    store: AudioStore,
    player: Arc<Player>,
    events: EventBus,
    songs: RwLock<Vec<Song>>,
    playlists: RwLock<Vec<Playlist>>,
}

impl Library {
    /// Load the library from the database
    pub async fn load(
        db: SqlitePool,
        store: AudioStore,
        player: Arc<Player>,
        events: EventBus,
    ) -> Result<Self> {
        let songs = song_db::list_songs(&db).await?;
        let playlists = playlist_db::list_playlists(&db).await?;
        info!(
            "Loaded library: {} songs, {} playlists",
            songs.len(),
            playlists.len()
        );

        Ok(Self {
            db,
            store,
            player,
            events,
            songs: RwLock::new(songs),
            playlists: RwLock::new(playlists),
        })
    }

    /// All songs in insertion order
    pub async fn songs(&self) -> Vec<Song> {
        self.songs.read().await.clone()
    }

    /// One song by id
    pub async fn song(&self, id: Uuid) -> Option<Song> {
        self.songs.read().await.iter().find(|s| s.id == id).cloned()
    }

    /// All playlists in insertion order
    pub async fn playlists(&self) -> Vec<Playlist> {
        self.playlists.read().await.clone()
    }

    /// One playlist by id
    pub async fn playlist(&self, id: Uuid) -> Option<Playlist> {
        self.playlists
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Upload a song: store the bytes, probe the duration from the decoded
    /// audio metadata, insert the record
    ///
    /// Rejects duplicates by case-insensitive title+artist match. On a
    /// decode failure the stored file is removed and no song is created.
    pub async fn add_song(
        &self,
        title: &str,
        artist: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Song> {
        let title = non_empty(title, "title")?;
        let artist = non_empty(artist, "artist")?;

        {
            let songs = self.songs.read().await;
            if songs.iter().any(|s| s.matches(&title, &artist)) {
                return Err(Error::Duplicate(format!(
                    "Song \"{}\" by {} already exists",
                    title, artist
                )));
            }
        }

        let url = self.store.save(file_name, bytes).await?;
        let path = self.store.path_for(&url)?;

        let duration_secs = match metadata::probe_duration(path).await {
            Ok(secs) => secs,
            Err(e) => {
                // No song record without readable audio; drop the file again
                if let Err(cleanup) = self.store.delete(&url).await {
                    warn!("Failed to remove unreadable upload: {}", cleanup);
                }
                return Err(e);
            }
        };

        let song = Song::new(title, artist, format_duration(duration_secs), url.clone());

        if let Err(e) = song_db::insert_song(&self.db, &song).await {
            if let Err(cleanup) = self.store.delete(&url).await {
                warn!("Failed to remove orphaned upload: {}", cleanup);
            }
            return Err(e);
        }

        self.songs.write().await.push(song.clone());
        info!("Added song \"{}\" by {} ({})", song.title, song.artist, song.id);

        self.events.emit(MixtapeEvent::SongAdded {
            song: song.clone(),
            timestamp: Utc::now(),
        });
        Ok(song)
    }

    /// Edit a song's title/artist, refreshing every playlist's denormalized
    /// copy and the playback session's snapshots
    pub async fn edit_song(&self, id: Uuid, title: &str, artist: &str) -> Result<Song> {
        let title = non_empty(title, "title")?;
        let artist = non_empty(artist, "artist")?;

        let mut songs = self.songs.write().await;
        let song = songs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("Song {}", id)))?;

        song_db::update_song(&self.db, id, &title, &artist).await?;
        playlist_db::update_entries_for_song(&self.db, id, &title, &artist).await?;

        song.title = title.clone();
        song.artist = artist.clone();
        let song = song.clone();
        drop(songs);

        let mut playlists = self.playlists.write().await;
        for playlist in playlists.iter_mut() {
            for snapshot in playlist.songs.iter_mut().filter(|s| s.id == id) {
                snapshot.title = title.clone();
                snapshot.artist = artist.clone();
            }
        }
        drop(playlists);

        self.player.handle_song_edited(&song).await;

        self.events.emit(MixtapeEvent::SongUpdated {
            song: song.clone(),
            timestamp: Utc::now(),
        });
        Ok(song)
    }

    /// Delete a song: purge it from every playlist, remove the audio file,
    /// and halt the playback session if it was the current track
    ///
    /// Idempotent: an absent id returns `None` rather than an error.
    pub async fn delete_song(&self, id: Uuid) -> Result<Option<Song>> {
        let mut songs = self.songs.write().await;
        let Some(index) = songs.iter().position(|s| s.id == id) else {
            return Ok(None);
        };

        playlist_db::delete_entries_for_song(&self.db, id).await?;
        song_db::delete_song(&self.db, id).await?;

        let song = songs.remove(index);
        drop(songs);

        // The record is gone; a file-system fault here is logged, not fatal
        if let Err(e) = self.store.delete(&song.url).await {
            warn!("Failed to delete audio file for {}: {}", song.id, e);
        }

        let mut playlists = self.playlists.write().await;
        for playlist in playlists.iter_mut() {
            playlist.songs.retain(|s| s.id != id);
        }
        drop(playlists);

        self.player.handle_song_deleted(id).await;
        info!("Deleted song \"{}\" ({})", song.title, song.id);

        self.events.emit(MixtapeEvent::SongDeleted {
            song_id: id,
            timestamp: Utc::now(),
        });
        Ok(Some(song))
    }

    /// Create an empty playlist
    pub async fn create_playlist(&self, name: &str, artist: Option<&str>) -> Result<Playlist> {
        let name = non_empty(name, "name")?;
        let artist = artist
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let playlist = Playlist::new(name, artist);
        playlist_db::insert_playlist(&self.db, &playlist).await?;
        self.playlists.write().await.push(playlist.clone());
        info!("Created playlist \"{}\" ({})", playlist.name, playlist.id);

        self.events.emit(MixtapeEvent::PlaylistCreated {
            playlist: playlist.clone(),
            timestamp: Utc::now(),
        });
        Ok(playlist)
    }

    /// Edit playlist name and owner label in place
    pub async fn edit_playlist(&self, id: Uuid, name: &str, artist: &str) -> Result<Playlist> {
        let name = non_empty(name, "name")?;
        let artist = non_empty(artist, "artist")?;

        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Playlist {}", id)))?;

        playlist_db::update_playlist(&self.db, id, &name, &artist).await?;
        playlist.name = name;
        playlist.artist = artist;
        let playlist = playlist.clone();
        drop(playlists);

        self.events.emit(MixtapeEvent::PlaylistUpdated {
            playlist: playlist.clone(),
            timestamp: Utc::now(),
        });
        Ok(playlist)
    }

    /// Delete a playlist; its songs survive in the library
    ///
    /// Idempotent like `delete_song`. The playback session's active sequence
    /// goes stale when it was launched from this playlist; the player
    /// degrades it to empty rather than stopping the current track.
    pub async fn delete_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let mut playlists = self.playlists.write().await;
        let Some(index) = playlists.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        playlist_db::delete_playlist(&self.db, id).await?;
        let playlist = playlists.remove(index);
        drop(playlists);

        self.player.handle_playlist_deleted(id).await;
        info!("Deleted playlist \"{}\" ({})", playlist.name, playlist.id);

        self.events.emit(MixtapeEvent::PlaylistDeleted {
            playlist_id: id,
            timestamp: Utc::now(),
        });
        Ok(Some(playlist))
    }

    /// Append a denormalized snapshot of a song to a playlist
    ///
    /// Rejects a song id the playlist already holds.
    pub async fn add_song_to_playlist(&self, playlist_id: Uuid, song_id: Uuid) -> Result<Playlist> {
        let song = self
            .song(song_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(format!("Playlist {}", playlist_id)))?;

        if playlist.contains_song(song_id) {
            return Err(Error::Duplicate(format!(
                "Playlist \"{}\" already contains \"{}\"",
                playlist.name, song.title
            )));
        }

        let position = playlist.songs.len() as i64;
        playlist_db::insert_entry(&self.db, playlist_id, position, &song).await?;
        playlist.songs.push(song);
        let playlist = playlist.clone();
        drop(playlists);

        self.events.emit(MixtapeEvent::PlaylistUpdated {
            playlist: playlist.clone(),
            timestamp: Utc::now(),
        });
        Ok(playlist)
    }

    /// Remove a song's snapshot from a playlist; removing an absent song is
    /// a no-op
    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: Uuid,
        song_id: Uuid,
    ) -> Result<Playlist> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(format!("Playlist {}", playlist_id)))?;

        playlist_db::delete_entry(&self.db, playlist_id, song_id).await?;
        playlist.songs.retain(|s| s.id != song_id);
        let playlist = playlist.clone();
        drop(playlists);

        self.events.emit(MixtapeEvent::PlaylistUpdated {
            playlist: playlist.clone(),
            timestamp: Utc::now(),
        });
        Ok(playlist)
    }
}

/// Trimmed, non-empty field or a `Validation` error
fn non_empty(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("Missing {}", field)));
    }
    Ok(value.to_string())
}

//! Playlist table operations
//!
//! A playlist row plus ordered snapshot rows in `playlist_entries`. Snapshot
//! maintenance on song edit/delete happens here with plain UPDATE/DELETE over
//! the denormalized columns.

use crate::db::songs::{parse_id, parse_timestamp};
use mixtape_common::models::{Playlist, Song};
use mixtape_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a playlist row (entries are inserted separately)
pub async fn insert_playlist(pool: &SqlitePool, playlist: &Playlist) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlists (id, name, artist, year, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(playlist.id.to_string())
    .bind(&playlist.name)
    .bind(&playlist.artist)
    .bind(playlist.year)
    .bind(playlist.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all playlists with their entries, in insertion order
pub async fn list_playlists(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, artist, year, created_at
        FROM playlists
        ORDER BY rowid ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut playlists = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: String = row.get("id");
        let created_at: String = row.get("created_at");
        let id = parse_id(&id)?;

        playlists.push(Playlist {
            id,
            name: row.get("name"),
            artist: row.get("artist"),
            year: row.get("year"),
            songs: list_entries(pool, id).await?,
            created_at: parse_timestamp(&created_at)?,
        });
    }

    Ok(playlists)
}

/// Update playlist name/artist in place
pub async fn update_playlist(pool: &SqlitePool, id: Uuid, name: &str, artist: &str) -> Result<()> {
    sqlx::query("UPDATE playlists SET name = ?, artist = ? WHERE id = ?")
        .bind(name)
        .bind(artist)
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a playlist; entry rows cascade
pub async fn delete_playlist(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Ordered snapshot entries of one playlist
async fn list_entries(pool: &SqlitePool, playlist_id: Uuid) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        r#"
        SELECT song_id, title, artist, duration, url, song_created_at
        FROM playlist_entries
        WHERE playlist_id = ?
        ORDER BY position ASC
        "#,
    )
    .bind(playlist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let song_id: String = row.get("song_id");
            let created_at: String = row.get("song_created_at");
            Ok(Song {
                id: parse_id(&song_id)?,
                title: row.get("title"),
                artist: row.get("artist"),
                duration: row.get("duration"),
                url: row.get("url"),
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}

/// Append a snapshot of `song` at `position`
pub async fn insert_entry(
    pool: &SqlitePool,
    playlist_id: Uuid,
    position: i64,
    song: &Song,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_entries
            (playlist_id, position, song_id, title, artist, duration, url, song_created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(playlist_id.to_string())
    .bind(position)
    .bind(song.id.to_string())
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.duration)
    .bind(&song.url)
    .bind(song.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove one song's snapshot from one playlist (absent is a no-op)
pub async fn delete_entry(pool: &SqlitePool, playlist_id: Uuid, song_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM playlist_entries WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id.to_string())
        .bind(song_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Purge a deleted song's snapshots from every playlist
pub async fn delete_entries_for_song(pool: &SqlitePool, song_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM playlist_entries WHERE song_id = ?")
        .bind(song_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Refresh an edited song's snapshots in every playlist
pub async fn update_entries_for_song(
    pool: &SqlitePool,
    song_id: Uuid,
    title: &str,
    artist: &str,
) -> Result<()> {
    sqlx::query("UPDATE playlist_entries SET title = ?, artist = ? WHERE song_id = ?")
        .bind(title)
        .bind(artist)
        .bind(song_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

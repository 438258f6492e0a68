//! Song table operations

use chrono::{DateTime, Utc};
use mixtape_common::models::Song;
use mixtape_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a song row
pub async fn insert_song(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (id, title, artist, duration, url, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
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

/// Load all songs in insertion order
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, artist, duration, url, created_at
        FROM songs
        ORDER BY rowid ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_song).collect()
}

/// Update title/artist in place
pub async fn update_song(pool: &SqlitePool, id: Uuid, title: &str, artist: &str) -> Result<()> {
    sqlx::query("UPDATE songs SET title = ?, artist = ? WHERE id = ?")
        .bind(title)
        .bind(artist)
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a song row (absent id is a no-op)
pub async fn delete_song(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

fn row_to_song(row: &sqlx::sqlite::SqliteRow) -> Result<Song> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(Song {
        id: parse_id(&id)?,
        title: row.get("title"),
        artist: row.get("artist"),
        duration: row.get("duration"),
        url: row.get("url"),
        created_at: parse_timestamp(&created_at)?,
    })
}

pub(crate) fn parse_id(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| Error::Internal(format!("Bad id in database: {}", e)))
}

pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Bad timestamp in database: {}", e)))
}

//! HTTP request handlers for the song and playlist catalog

use crate::api::server::AppContext;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use mixtape_common::models::{Playlist, Song};
use mixtape_common::Error;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct EditSongRequest {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub artist: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditPlaylistRequest {
    pub name: String,
    pub artist: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub song_id: Uuid,
}

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

/// Map the error taxonomy onto the HTTP contract: 4xx for client faults,
/// 5xx for the rest, body always `{ "error": ... }`
pub fn error_response(err: &Error) -> ErrorResponse {
    let status = match err {
        Error::Validation(_) | Error::Duplicate(_) | Error::Decode(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

pub fn not_found(what: &str) -> ErrorResponse {
    error_response(&Error::NotFound(what.to_string()))
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "mixtape".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Song Endpoints
// ============================================================================

/// GET /songs - All songs in insertion order
pub async fn list_songs(State(ctx): State<AppContext>) -> Json<Vec<Song>> {
    Json(ctx.library.songs().await)
}

/// POST /songs - Upload a song (multipart form: title, artist, file)
///
/// The duration is computed server-side from the decoded audio; a client
/// `duration` field is accepted and ignored.
pub async fn upload_song(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Song>), ErrorResponse> {
    let mut title = String::new();
    let mut artist = String::new();
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(&Error::Validation(format!(
                    "Malformed upload: {}",
                    e
                ))))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| error_response(&Error::Validation(e.to_string())))?;
            }
            "artist" => {
                artist = field
                    .text()
                    .await
                    .map_err(|e| error_response(&Error::Validation(e.to_string())))?;
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| error_response(&Error::Validation(e.to_string())))?;
                file = Some((file_name, bytes.to_vec()));
            }
            // Ignore unknown fields (including a client-computed duration)
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(error_response(&Error::Validation(
            "Missing file".to_string(),
        )));
    };

    match ctx.library.add_song(&title, &artist, &file_name, &bytes).await {
        Ok(song) => Ok((StatusCode::CREATED, Json(song))),
        Err(e) => Err(error_response(&e)),
    }
}

/// PUT /songs/:id - Edit title/artist
pub async fn edit_song(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditSongRequest>,
) -> Result<Json<Song>, ErrorResponse> {
    match ctx.library.edit_song(id, &req.title, &req.artist).await {
        Ok(song) => Ok(Json(song)),
        Err(e) => Err(error_response(&e)),
    }
}

/// DELETE /songs/:id - Delete a song and its audio file
pub async fn delete_song(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Song>, ErrorResponse> {
    match ctx.library.delete_song(id).await {
        Ok(Some(song)) => Ok(Json(song)),
        Ok(None) => Err(not_found("Song")),
        Err(e) => Err(error_response(&e)),
    }
}

// ============================================================================
// Playlist Endpoints
// ============================================================================

/// GET /playlists - All playlists with their snapshots
pub async fn list_playlists(State(ctx): State<AppContext>) -> Json<Vec<Playlist>> {
    Json(ctx.library.playlists().await)
}

/// POST /playlists - Create an empty playlist
pub async fn create_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Playlist>), ErrorResponse> {
    match ctx
        .library
        .create_playlist(&req.name, req.artist.as_deref())
        .await
    {
        Ok(playlist) => Ok((StatusCode::CREATED, Json(playlist))),
        Err(e) => Err(error_response(&e)),
    }
}

/// GET /playlists/:id
pub async fn get_playlist(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Playlist>, ErrorResponse> {
    match ctx.library.playlist(id).await {
        Some(playlist) => Ok(Json(playlist)),
        None => Err(not_found("Playlist")),
    }
}

/// PUT /playlists/:id - Edit name/owner label
pub async fn edit_playlist(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditPlaylistRequest>,
) -> Result<Json<Playlist>, ErrorResponse> {
    match ctx.library.edit_playlist(id, &req.name, &req.artist).await {
        Ok(playlist) => Ok(Json(playlist)),
        Err(e) => Err(error_response(&e)),
    }
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    match ctx.library.delete_playlist(id).await {
        Ok(Some(playlist)) => Ok(Json(MessageResponse {
            message: format!("Playlist \"{}\" deleted", playlist.name),
        })),
        Ok(None) => Err(not_found("Playlist")),
        Err(e) => Err(error_response(&e)),
    }
}

/// POST /playlists/:id/songs - Add a song snapshot to a playlist
pub async fn add_song_to_playlist(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddSongRequest>,
) -> Result<Json<Playlist>, ErrorResponse> {
    match ctx.library.add_song_to_playlist(id, req.song_id).await {
        Ok(playlist) => Ok(Json(playlist)),
        Err(e) => Err(error_response(&e)),
    }
}

/// DELETE /playlists/:id/songs/:song_id - Remove a song from a playlist
pub async fn remove_song_from_playlist(
    State(ctx): State<AppContext>,
    Path((id, song_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Playlist>, ErrorResponse> {
    match ctx.library.remove_song_from_playlist(id, song_id).await {
        Ok(playlist) => Ok(Json(playlist)),
        Err(e) => Err(error_response(&e)),
    }
}

//! HTTP handlers for the playback session
//!
//! The browser view issues its transport intents here and re-renders from
//! the returned session snapshot (and from the SSE stream).

use crate::api::handlers::{error_response, not_found, ErrorResponse};
use crate::api::server::AppContext;
use crate::player::PlayerState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub song_id: Uuid,
    /// Playlist context the song was clicked in; its snapshots become the
    /// active skip sequence
    pub playlist_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub position_secs: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VolumeRequest {
    /// Volume level 0.0-1.0
    pub volume: f32,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    pub volume: f32,
    pub muted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub playlist_id: Uuid,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /player/state
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerState> {
    Json(ctx.player.state().await)
}

/// POST /player/select - Load a song and start playing
///
/// With a `playlist_id` the song must be in that playlist and the playlist's
/// snapshots become the active sequence; otherwise the whole library is.
pub async fn select(
    State(ctx): State<AppContext>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<PlayerState>, ErrorResponse> {
    let (song, sequence) = match req.playlist_id {
        Some(playlist_id) => {
            let Some(playlist) = ctx.library.playlist(playlist_id).await else {
                return Err(not_found("Playlist"));
            };
            let Some(song) = playlist.songs.iter().find(|s| s.id == req.song_id).cloned() else {
                return Err(not_found("Song in playlist"));
            };
            (song, playlist.songs)
        }
        None => {
            let Some(song) = ctx.library.song(req.song_id).await else {
                return Err(not_found("Song"));
            };
            (song, ctx.library.songs().await)
        }
    };

    ctx.player.select(song, sequence, req.playlist_id).await;
    Ok(Json(ctx.player.state().await))
}

/// POST /player/toggle - Flip play/pause
pub async fn toggle(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.toggle().await;
    Json(ctx.player.state().await)
}

/// POST /player/next
pub async fn next(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.next().await;
    Json(ctx.player.state().await)
}

/// POST /player/previous
pub async fn previous(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.previous().await;
    Json(ctx.player.state().await)
}

/// POST /player/ended - The view's audio element finished the track
pub async fn ended(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.on_ended().await;
    Json(ctx.player.state().await)
}

/// POST /player/seek
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Json<PlayerState> {
    ctx.player.seek(req.position_secs).await;
    Json(ctx.player.state().await)
}

/// GET /player/volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    let state = ctx.player.state().await;
    Json(VolumeResponse {
        volume: state.volume,
        muted: state.muted,
    })
}

/// POST /player/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, ErrorResponse> {
    if !req.volume.is_finite() {
        return Err(error_response(&mixtape_common::Error::Validation(
            "Volume must be a number".to_string(),
        )));
    }
    ctx.player.set_volume(req.volume).await;
    let state = ctx.player.state().await;
    Ok(Json(VolumeResponse {
        volume: state.volume,
        muted: state.muted,
    }))
}

/// POST /player/mute - Toggle mute, remembering the pre-mute volume
pub async fn toggle_mute(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.toggle_mute().await;
    Json(ctx.player.state().await)
}

/// POST /player/reset - Force the session back to empty
pub async fn reset(State(ctx): State<AppContext>) -> Json<PlayerState> {
    ctx.player.reset().await;
    Json(ctx.player.state().await)
}

/// POST /player/release - The view left a playlist page; stop only if the
/// current track was launched from it
pub async fn release(
    State(ctx): State<AppContext>,
    Json(req): Json<ReleaseRequest>,
) -> Json<PlayerState> {
    ctx.player.release_context(req.playlist_id).await;
    Json(ctx.player.state().await)
}

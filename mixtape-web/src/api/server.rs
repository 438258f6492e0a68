//! HTTP server setup and routing

use crate::library::Library;
use crate::player::Player;
use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{delete, get, post, put},
    Router,
};
use mixtape_common::{Error, EventBus, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub library: Arc<Library>,
    pub player: Arc<Player>,
    pub events: EventBus,
}

/// Build the application router
///
/// `audio_dir` is the folder uploads are stored in; it is served under
/// `/audio/` so the browser's audio element can fetch the bytes directly.
pub fn create_router(ctx: AppContext, audio_dir: &Path) -> Router {
    Router::new()
        // Built-in browser UI
        .route("/", get(|| async { Html(include_str!("ui.html")) }))
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Song catalog
        .route("/songs", get(super::handlers::list_songs))
        .route("/songs", post(super::handlers::upload_song))
        .route("/songs/:id", put(super::handlers::edit_song))
        .route("/songs/:id", delete(super::handlers::delete_song))
        // Playlists
        .route("/playlists", get(super::handlers::list_playlists))
        .route("/playlists", post(super::handlers::create_playlist))
        .route("/playlists/:id", get(super::handlers::get_playlist))
        .route("/playlists/:id", put(super::handlers::edit_playlist))
        .route("/playlists/:id", delete(super::handlers::delete_playlist))
        .route("/playlists/:id/songs", post(super::handlers::add_song_to_playlist))
        .route(
            "/playlists/:id/songs/:song_id",
            delete(super::handlers::remove_song_from_playlist),
        )
        // Playback session
        .route("/player/state", get(super::player::get_state))
        .route("/player/select", post(super::player::select))
        .route("/player/toggle", post(super::player::toggle))
        .route("/player/next", post(super::player::next))
        .route("/player/previous", post(super::player::previous))
        .route("/player/ended", post(super::player::ended))
        .route("/player/seek", post(super::player::seek))
        .route("/player/volume", get(super::player::get_volume))
        .route("/player/volume", post(super::player::set_volume))
        .route("/player/mute", post(super::player::toggle_mute))
        .route("/player/reset", post(super::player::reset))
        .route("/player/release", post(super::player::release))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Uploaded audio bytes
        .nest_service("/audio", ServeDir::new(audio_dir))
        // Attach application context
        .with_state(ctx)
        // Audio uploads are far bigger than the default body limit
        .layer(DefaultBodyLimit::max(256 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until shutdown
pub async fn run(
    port: u16,
    ctx: AppContext,
    audio_dir: &Path,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(ctx, audio_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}

//! Server-Sent Events (SSE) broadcaster
//!
//! Streams library and playback events to connected views.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{Stream, StreamExt};
use mixtape_common::MixtapeEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    let rx = ctx.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    let event_type = event_type_str(&event);
                    debug!("Broadcasting SSE event: {}", event_type);
                    Some(Ok(Event::default().event(event_type).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // BroadcastStream error (lagged or closed)
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Extract event type string from MixtapeEvent
fn event_type_str(event: &MixtapeEvent) -> &'static str {
    match event {
        MixtapeEvent::SongAdded { .. } => "SongAdded",
        MixtapeEvent::SongUpdated { .. } => "SongUpdated",
        MixtapeEvent::SongDeleted { .. } => "SongDeleted",
        MixtapeEvent::PlaylistCreated { .. } => "PlaylistCreated",
        MixtapeEvent::PlaylistUpdated { .. } => "PlaylistUpdated",
        MixtapeEvent::PlaylistDeleted { .. } => "PlaylistDeleted",
        MixtapeEvent::TrackLoaded { .. } => "TrackLoaded",
        MixtapeEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
        MixtapeEvent::PositionChanged { .. } => "PositionChanged",
        MixtapeEvent::VolumeChanged { .. } => "VolumeChanged",
        MixtapeEvent::PlayerCleared { .. } => "PlayerCleared",
    }
}

//! Integration tests for the mixtape HTTP API
//!
//! Drives the complete router: catalog CRUD with real multipart uploads,
//! playlist membership, player intents, and the static audio route.

use axum::body::Body;
use axum::http::StatusCode;
use http::{Method, Request};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use mixtape_common::EventBus;
use mixtape_web::api::{create_router, AppContext};
use mixtape_web::db::create_schema;
use mixtape_web::library::Library;
use mixtape_web::player::Player;
use mixtape_web::storage::AudioStore;

const BOUNDARY: &str = "mixtape-test-boundary";

/// Test helper to create a router over an in-memory database and a temp store
async fn setup_test_app() -> (axum::Router, tempfile::TempDir) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    create_schema(&pool).await.expect("Failed to create schema");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = AudioStore::new(dir.path()).expect("Failed to open store");
    let events = EventBus::default();
    let player = Arc::new(Player::new(events.clone()));
    let library = Arc::new(
        Library::load(pool, store, Arc::clone(&player), events.clone())
            .await
            .expect("Failed to load library"),
    );

    let ctx = AppContext {
        library,
        player,
        events,
    };
    (create_router(ctx, dir.path()), dir)
}

/// Helper function to make JSON requests to the test app
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        _ => panic!("Unsupported method"),
    };

    let mut request = Request::builder().method(method).uri(path);
    let request = if let Some(json_body) = body {
        request = request.header("content-type", "application/json");
        request.body(Body::from(json_body.to_string())).unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };
    (status, json_body)
}

/// Synthesize a short mono WAV in memory
fn wav_bytes(seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(seconds * 44100.0) as usize {
            writer
                .write_sample(((i as f32 * 0.07).sin() * 6000.0) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Build a multipart upload body for POST /songs
fn upload_body(title: &str, artist: &str, file_name: &str, file: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [("title", title), ("artist", artist)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{file_name}\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST /songs with a synthesized WAV; returns (status, body)
async fn upload_song(
    app: &axum::Router,
    title: &str,
    artist: &str,
) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/songs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(upload_body(
            title,
            artist,
            "track.wav",
            &wav_bytes(1.0),
        )))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup_test_app().await;
    let (status, body) = make_request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn test_upload_and_list_songs() {
    let (app, _dir) = setup_test_app().await;

    let (status, body) = upload_song(&app, "Tone", "Sine").await;
    assert_eq!(status, StatusCode::CREATED);
    let song = body.unwrap();
    assert_eq!(song["title"], "Tone");
    assert_eq!(song["artist"], "Sine");
    // Duration computed server-side from the decoded audio
    assert_eq!(song["duration"], "0:01");
    let url = song["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/audio/"));

    let (status, body) = make_request(&app, "GET", "/songs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().as_array().unwrap().len(), 1);

    // The uploaded bytes are served back on the static route
    let (status, _) = make_request(&app, "GET", &url, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejects_duplicates_and_missing_fields() {
    let (app, _dir) = setup_test_app().await;

    let (status, _) = upload_song(&app, "Tone", "Sine").await;
    assert_eq!(status, StatusCode::CREATED);

    // Case-insensitive duplicate
    let (status, body) = upload_song(&app, "TONE", "sine").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].as_str().unwrap().contains("exists"));

    // Missing title
    let (status, body) = upload_song(&app, "", "Sine").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].is_string());

    let (_, body) = make_request(&app, "GET", "/songs", None).await;
    assert_eq!(body.unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_rejects_unreadable_audio() {
    let (app, _dir) = setup_test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/songs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(upload_body(
            "Noise",
            "Static",
            "noise.wav",
            b"definitely not audio",
        )))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, body) = make_request(&app, "GET", "/songs", None).await;
    assert!(body.unwrap().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_song_cascades_into_playlists() {
    let (app, _dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Old", "Artist").await;
    let song_id = song.unwrap()["id"].as_str().unwrap().to_string();

    let (_, playlist) =
        make_request(&app, "POST", "/playlists", Some(json!({"name": "P"}))).await;
    let playlist_id = playlist.unwrap()["id"].as_str().unwrap().to_string();

    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = make_request(
        &app,
        "PUT",
        &format!("/songs/{song_id}"),
        Some(json!({"title": "New", "artist": "Other"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["title"], "New");

    // The playlist's denormalized copy follows
    let (_, body) =
        make_request(&app, "GET", &format!("/playlists/{playlist_id}"), None).await;
    let playlist = body.unwrap();
    assert_eq!(playlist["songs"][0]["title"], "New");
    assert_eq!(playlist["songs"][0]["artist"], "Other");

    // Validation and not-found
    let (status, _) = make_request(
        &app,
        "PUT",
        &format!("/songs/{song_id}"),
        Some(json!({"title": "", "artist": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = make_request(
        &app,
        "PUT",
        &format!("/songs/{}", uuid::Uuid::new_v4()),
        Some(json!({"title": "T", "artist": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_song_purges_playlists_and_file() {
    let (app, dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Tone", "Sine").await;
    let song = song.unwrap();
    let song_id = song["id"].as_str().unwrap().to_string();
    let file_name = song["url"].as_str().unwrap().trim_start_matches("/audio/").to_string();

    let (_, playlist) =
        make_request(&app, "POST", "/playlists", Some(json!({"name": "P"}))).await;
    let playlist_id = playlist.unwrap()["id"].as_str().unwrap().to_string();
    make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": song_id})),
    )
    .await;

    let (status, body) =
        make_request(&app, "DELETE", &format!("/songs/{song_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["id"], song_id.as_str());

    // Audio file removed from disk
    assert!(!dir.path().join(&file_name).exists());

    // Purged from the playlist
    let (_, body) =
        make_request(&app, "GET", &format!("/playlists/{playlist_id}"), None).await;
    assert!(body.unwrap()["songs"].as_array().unwrap().is_empty());

    // Absent id maps to 404 at the HTTP boundary
    let (status, _) = make_request(&app, "DELETE", &format!("/songs/{song_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Re-upload with the same title/artist succeeds
    let (status, _) = upload_song(&app, "Tone", "Sine").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_playlist_crud() {
    let (app, _dir) = setup_test_app().await;

    // Empty name rejected
    let (status, _) =
        make_request(&app, "POST", "/playlists", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = make_request(
        &app,
        "POST",
        "/playlists",
        Some(json!({"name": "Road Trip"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist = body.unwrap();
    assert_eq!(playlist["artist"], "Your Playlist");
    let playlist_id = playlist["id"].as_str().unwrap().to_string();

    let (status, body) = make_request(
        &app,
        "PUT",
        &format!("/playlists/{playlist_id}"),
        Some(json!({"name": "Road Trip 2", "artist": "Me"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["name"], "Road Trip 2");

    let (status, _) =
        make_request(&app, "GET", &format!("/playlists/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        make_request(&app, "DELETE", &format!("/playlists/{playlist_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["message"].is_string());

    let (status, _) =
        make_request(&app, "DELETE", &format!("/playlists/{playlist_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_playlist_membership_contract() {
    let (app, _dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Tone", "Sine").await;
    let song_id = song.unwrap()["id"].as_str().unwrap().to_string();
    let (_, playlist) = make_request(
        &app,
        "POST",
        "/playlists",
        Some(json!({"name": "Road Trip"})),
    )
    .await;
    let playlist_id = playlist.unwrap()["id"].as_str().unwrap().to_string();

    // First add succeeds
    let (status, body) = make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["songs"].as_array().unwrap().len(), 1);

    // Second add is a duplicate; count unchanged
    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) =
        make_request(&app, "GET", &format!("/playlists/{playlist_id}"), None).await;
    assert_eq!(body.unwrap()["songs"].as_array().unwrap().len(), 1);

    // Unknown song id
    let (status, _) = make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": uuid::Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Removal returns the playlist; removing again is still 200
    let (status, body) = make_request(
        &app,
        "DELETE",
        &format!("/playlists/{playlist_id}/songs/{song_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap()["songs"].as_array().unwrap().is_empty());
    let (status, _) = make_request(
        &app,
        "DELETE",
        &format!("/playlists/{playlist_id}/songs/{song_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_player_select_and_skip_within_playlist() {
    let (app, _dir) = setup_test_app().await;

    let mut song_ids = Vec::new();
    for title in ["A", "B", "C"] {
        let (_, song) = upload_song(&app, title, "Artist").await;
        song_ids.push(song.unwrap()["id"].as_str().unwrap().to_string());
    }
    let (_, playlist) =
        make_request(&app, "POST", "/playlists", Some(json!({"name": "P"}))).await;
    let playlist_id = playlist.unwrap()["id"].as_str().unwrap().to_string();
    for id in &song_ids {
        make_request(
            &app,
            "POST",
            &format!("/playlists/{playlist_id}/songs"),
            Some(json!({"song_id": id})),
        )
        .await;
    }

    // Select C from the playlist context
    let (status, body) = make_request(
        &app,
        "POST",
        "/player/select",
        Some(json!({"song_id": song_ids[2], "playlist_id": playlist_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let state = body.unwrap();
    assert_eq!(state["song"]["id"], song_ids[2].as_str());
    assert_eq!(state["playing"], true);
    assert_eq!(state["playlist_id"], playlist_id.as_str());

    // Forward from C wraps to A
    let (_, body) = make_request(&app, "POST", "/player/next", None).await;
    assert_eq!(body.unwrap()["song"]["id"], song_ids[0].as_str());

    // Backward from A wraps to C
    let (_, body) = make_request(&app, "POST", "/player/previous", None).await;
    assert_eq!(body.unwrap()["song"]["id"], song_ids[2].as_str());

    // Track end auto-advances and keeps playing
    let (_, body) = make_request(&app, "POST", "/player/ended", None).await;
    let state = body.unwrap();
    assert_eq!(state["song"]["id"], song_ids[0].as_str());
    assert_eq!(state["playing"], true);

    // Selecting a song outside the playlist context fails
    let (_, other) = upload_song(&app, "Stray", "Artist").await;
    let stray = other.unwrap()["id"].as_str().unwrap().to_string();
    let (status, _) = make_request(
        &app,
        "POST",
        "/player/select",
        Some(json!({"song_id": stray, "playlist_id": playlist_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_player_toggle_seek_and_volume() {
    let (app, _dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Tone", "Sine").await;
    let song_id = song.unwrap()["id"].as_str().unwrap().to_string();
    make_request(
        &app,
        "POST",
        "/player/select",
        Some(json!({"song_id": song_id})),
    )
    .await;

    // Pause, then seek past the end clamps to the duration and stays paused
    let (_, body) = make_request(&app, "POST", "/player/toggle", None).await;
    assert_eq!(body.unwrap()["playing"], false);
    let (_, body) = make_request(
        &app,
        "POST",
        "/player/seek",
        Some(json!({"position_secs": 900.0})),
    )
    .await;
    let state = body.unwrap();
    assert_eq!(state["position_secs"], 1.0);
    assert_eq!(state["playing"], false);

    // Volume/mute round trip restores exactly
    let (_, body) = make_request(
        &app,
        "POST",
        "/player/volume",
        Some(json!({"volume": 0.6})),
    )
    .await;
    assert_eq!(body.unwrap()["volume"].as_f64().unwrap(), 0.6f32 as f64);
    let (_, body) = make_request(&app, "POST", "/player/mute", None).await;
    let state = body.unwrap();
    assert_eq!(state["muted"], true);
    assert_eq!(state["volume"].as_f64().unwrap(), 0.0);
    let (_, body) = make_request(&app, "POST", "/player/mute", None).await;
    let state = body.unwrap();
    assert_eq!(state["muted"], false);
    assert_eq!(state["volume"].as_f64().unwrap(), 0.6f32 as f64);
}

#[tokio::test]
async fn test_player_release_is_context_aware() {
    let (app, _dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Tone", "Sine").await;
    let song_id = song.unwrap()["id"].as_str().unwrap().to_string();
    let (_, playlist) =
        make_request(&app, "POST", "/playlists", Some(json!({"name": "P"}))).await;
    let playlist_id = playlist.unwrap()["id"].as_str().unwrap().to_string();
    make_request(
        &app,
        "POST",
        &format!("/playlists/{playlist_id}/songs"),
        Some(json!({"song_id": song_id})),
    )
    .await;
    make_request(
        &app,
        "POST",
        "/player/select",
        Some(json!({"song_id": song_id, "playlist_id": playlist_id})),
    )
    .await;

    // Leaving an unrelated playlist page changes nothing
    let (_, body) = make_request(
        &app,
        "POST",
        "/player/release",
        Some(json!({"playlist_id": uuid::Uuid::new_v4()})),
    )
    .await;
    assert_eq!(body.unwrap()["playing"], true);

    // Leaving the owning playlist page stops playback
    let (_, body) = make_request(
        &app,
        "POST",
        "/player/release",
        Some(json!({"playlist_id": playlist_id})),
    )
    .await;
    let state = body.unwrap();
    assert!(state["song"].is_null());
    assert_eq!(state["playing"], false);
}

#[tokio::test]
async fn test_deleting_current_song_clears_player() {
    let (app, _dir) = setup_test_app().await;

    let (_, song) = upload_song(&app, "Tone", "Sine").await;
    let song_id = song.unwrap()["id"].as_str().unwrap().to_string();
    make_request(
        &app,
        "POST",
        "/player/select",
        Some(json!({"song_id": song_id})),
    )
    .await;

    make_request(&app, "DELETE", &format!("/songs/{song_id}"), None).await;

    let (_, body) = make_request(&app, "GET", "/player/state", None).await;
    let state = body.unwrap();
    assert!(state["song"].is_null());
    assert_eq!(state["playing"], false);
}

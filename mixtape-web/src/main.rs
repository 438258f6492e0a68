//! Mixtape web service - Main entry point
//!
//! Personal music-library backend: REST + SSE API over SQLite, on-disk audio
//! storage, and the in-process library/playback core.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mixtape_common::{config, EventBus};
use mixtape_web::api::{self, AppContext};
use mixtape_web::db;
use mixtape_web::library::Library;
use mixtape_web::player::Player;
use mixtape_web::storage::AudioStore;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mixtape-web
#[derive(Parser, Debug)]
#[command(name = "mixtape-web")]
#[command(about = "Personal music-library web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5001", env = "MIXTAPE_PORT")]
    port: u16,

    /// Folder holding the uploaded audio files (and, by default, the
    /// database); falls back to MIXTAPE_MUSIC_DIR, the config file, or an
    /// OS-dependent default
    #[arg(short, long)]
    music_dir: Option<PathBuf>,

    /// Database file path (defaults to mixtape.db inside the music folder)
    #[arg(short, long, env = "MIXTAPE_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mixtape_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let music_dir = config::resolve_music_dir(args.music_dir.as_deref())
        .context("Failed to resolve music folder")?;
    let db_path = args
        .database
        .unwrap_or_else(|| config::default_database_path(&music_dir));

    info!("Starting mixtape on port {}", args.port);
    info!("Music folder: {}", music_dir.display());
    info!("Database: {}", db_path.display());

    let store = AudioStore::new(&music_dir).context("Failed to open audio store")?;
    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let events = EventBus::default();
    let player = Arc::new(Player::new(events.clone()));
    let library = Arc::new(
        Library::load(pool, store, Arc::clone(&player), events.clone())
            .await
            .context("Failed to load library")?,
    );

    let ctx = AppContext {
        library,
        player,
        events,
    };

    api::run(args.port, ctx, &music_dir, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

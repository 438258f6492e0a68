//! Configuration loading and music folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the music folder
pub const MUSIC_DIR_ENV: &str = "MIXTAPE_MUSIC_DIR";

/// Music folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`music_dir` key)
/// 4. OS-dependent compiled default (fallback)
///
/// The music folder holds the uploaded audio files and, by default, the
/// SQLite database.
pub fn resolve_music_dir(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(MUSIC_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Some(dir) = music_dir_from_toml(&toml_content) {
                tracing::debug!("Music folder from {}", config_path.display());
                return Ok(dir);
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_music_dir())
}

/// Extract the `music_dir` key from config file contents
fn music_dir_from_toml(toml_content: &str) -> Option<PathBuf> {
    let config = toml::from_str::<toml::Value>(toml_content).ok()?;
    config
        .get("music_dir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// Default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mixtape").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mixtape/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default music folder
fn default_music_dir() -> PathBuf {
    dirs::audio_dir()
        .map(|d| d.join("mixtape"))
        .or_else(|| dirs::data_local_dir().map(|d| d.join("mixtape")))
        .unwrap_or_else(|| PathBuf::from("./mixtape_data"))
}

/// Default database location inside the music folder
pub fn default_database_path(music_dir: &Path) -> PathBuf {
    music_dir.join("mixtape.db")
}

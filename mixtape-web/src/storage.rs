//! On-disk audio file store
//!
//! Uploads land in the music folder under a fresh UUID file name (original
//! extension preserved) and are served back under the `/audio/` static route.
//! Deleting a song removes its file here.

use mixtape_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// URL prefix the stored files are served under
pub const AUDIO_ROUTE: &str = "/audio";

/// Audio file store rooted at the music folder
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Open a store at `dir`, creating the folder if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Folder the static file route serves from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write uploaded bytes under a fresh name; returns the public URL
    ///
    /// The original file name contributes only its extension.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let file_name = match extension_of(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Storage(format!("Failed to store upload: {}", e)))?;

        debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("{}/{}", AUDIO_ROUTE, file_name))
    }

    /// Absolute path of a stored file, from its public URL
    ///
    /// Rejects URLs that do not point directly into the store (path
    /// separators in the file name, unknown prefix).
    pub fn path_for(&self, url: &str) -> Result<PathBuf> {
        let file_name = url
            .strip_prefix(AUDIO_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| Error::Storage(format!("Not an audio URL: {}", url)))?;

        if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
            return Err(Error::Storage(format!("Bad audio file name: {}", file_name)));
        }

        Ok(self.dir.join(file_name))
    }

    /// Delete the file behind a song URL
    ///
    /// A file that is already gone only logs; the catalog record is what
    /// matters and the delete operation must stay idempotent.
    pub async fn delete(&self, url: &str) -> Result<()> {
        let path = self.path_for(url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted audio file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Audio file already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(Error::Storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
}

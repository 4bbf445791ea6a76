//! Scratch directory holding the audio of the current track

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::MediaError;
use crate::extractor::TrackInfo;
use crate::utils;

/// Extensions the transcoded audio may end up with, in lookup order
pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "m4a", "webm", "opus"];

/// A downloaded track resolved to a file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTrack {
    pub title: String,
    pub path: PathBuf,
    pub extension: &'static str,
}

/// Process-wide download directory
///
/// Holds at most one track's files at a time: [`ScratchDir::prepare`] empties
/// it before every download and [`ScratchDir::remove`] deletes it on stop.
/// There is no locking; overlapping `/play` commands share it.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the directory exists and is empty
    ///
    /// Entries that cannot be deleted are logged and skipped. Returns the
    /// number of entries removed.
    pub async fn prepare(&self) -> Result<usize, MediaError> {
        tokio::fs::create_dir_all(&self.path).await?;

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let result = match entry.file_type().await {
                Ok(ft) if ft.is_dir() => tokio::fs::remove_dir_all(&path).await,
                _ => tokio::fs::remove_file(&path).await,
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to delete {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            tracing::debug!("Cleared {} old file(s) from {}", removed, self.path.display());
        }
        Ok(removed)
    }

    /// Delete the directory and everything in it; a missing directory is fine
    pub async fn remove(&self) -> Result<(), MediaError> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                tracing::debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Find the file the extractor produced for `track`
///
/// Checks `base_path` + each of [`AUDIO_EXTENSIONS`] in order and returns
/// the first one that exists.
pub async fn resolve_track(track: &TrackInfo) -> Result<DownloadedTrack, MediaError> {
    for ext in AUDIO_EXTENSIONS {
        let candidate = utils::append_extension(&track.base_path, ext);
        if tokio::fs::metadata(&candidate).await.is_ok() {
            return Ok(DownloadedTrack {
                title: track.title.clone(),
                path: candidate,
                extension: ext,
            });
        }
    }
    Err(MediaError::FileNotFound(track.base_path.clone()))
}

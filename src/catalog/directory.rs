//! Catalog laid out on disk as `<root>/<bpm>/<audio files>`

use super::assets::is_plain_segment;
use super::TrackCatalog;
use crate::error::CatalogError;
use crate::model::Track;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as audio tracks
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac"];

/// Catalog read from a directory tree, enumerated on every call
///
/// There is no index: each lookup lists the bucket folder afresh, so files
/// added or uploaded while the service runs are picked up immediately.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding the tracks for `bucket`
    pub fn bucket_dir(&self, bucket: u32) -> PathBuf {
        self.root.join(bucket.to_string())
    }

    /// Numeric bucket folders present under the root, ascending
    pub fn buckets_on_disk(&self) -> Result<Vec<u32>, CatalogError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut buckets = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| CatalogError::Enumerate {
                path: self.root.clone(),
                source,
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(bpm) = entry.file_name().to_str().and_then(|n| n.parse::<u32>().ok()) {
                buckets.push(bpm);
            }
        }

        buckets.sort_unstable();
        Ok(buckets)
    }

    /// Persist an uploaded file under the bucket folder
    ///
    /// The name must be a single plain file name. Size and content are not
    /// checked here; that is the caller's job.
    pub fn store_upload(&self, bucket: u32, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CatalogError> {
        if !is_plain_segment(file_name) {
            return Err(CatalogError::InvalidUploadName(file_name.to_string()));
        }

        let dir = self.bucket_dir(bucket);
        fs::create_dir_all(&dir)?;

        let dest = dir.join(file_name);
        fs::write(&dest, bytes)?;

        log::info!("Stored upload {:?} ({} bytes)", dest, bytes.len());
        Ok(dest)
    }
}

impl TrackCatalog for DirectoryCatalog {
    fn tracks(&self, bucket: u32) -> Result<Vec<Track>, CatalogError> {
        let dir = self.bucket_dir(bucket);
        if !dir.is_dir() {
            log::debug!("No catalog folder for {} bpm at {:?}", bucket, dir);
            return Ok(Vec::new());
        }

        let mut tracks = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| CatalogError::Enumerate {
                path: dir.clone(),
                source,
            })?;

            if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                log::warn!("Skipping non-UTF-8 file name in {:?}", dir);
                continue;
            };
            tracks.push(Track::new(bucket, name, entry.path().to_path_buf()));
        }

        Ok(tracks)
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

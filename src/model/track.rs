use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A catalog track filed under one tempo bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog-relative key, e.g. `130/song.mp3`
    pub id: String,

    /// Tempo bucket (bpm) the track is filed under
    pub bucket: u32,

    /// File path to the audio file
    pub file_path: PathBuf,

    /// Metadata supplied by the tag-reading collaborator, passed through untouched
    pub metadata: Option<TrackMetadata>,
}

impl Track {
    pub fn new(bucket: u32, file_name: &str, file_path: PathBuf) -> Self {
        Self {
            id: format!("{}/{}", bucket, file_name),
            bucket,
            file_path,
            metadata: None,
        }
    }

    /// File name without extension, used as a fallback title
    pub fn stem(&self) -> Option<String> {
        self.file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }
}

/// Tag-derived track metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,

    /// Asset key of the extracted cover image, relative to the asset root
    pub cover_key: Option<String>,
}

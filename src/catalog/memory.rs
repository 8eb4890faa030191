use super::TrackCatalog;
use crate::error::CatalogError;
use crate::model::Track;
use std::collections::HashMap;

/// Catalog held in memory, keyed by bucket
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    buckets: HashMap<u32, Vec<Track>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bucket with no tracks
    pub fn add_bucket(&mut self, bucket: u32) {
        self.buckets.entry(bucket).or_default();
    }

    /// Add a track under its own bucket
    pub fn add_track(&mut self, track: Track) {
        self.buckets.entry(track.bucket).or_default().push(track);
    }

    pub fn track_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

impl TrackCatalog for InMemoryCatalog {
    fn tracks(&self, bucket: u32) -> Result<Vec<Track>, CatalogError> {
        Ok(self.buckets.get(&bucket).cloned().unwrap_or_default())
    }
}

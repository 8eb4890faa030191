//! Track catalog collaborator
//!
//! The live pipeline only needs "which tracks are filed under this bpm".
//! The trait keeps it independent of where those tracks live.

mod assets;
mod directory;
mod memory;

pub use assets::AssetKey;
pub use directory::DirectoryCatalog;
pub use memory::InMemoryCatalog;

use crate::error::CatalogError;
use crate::model::Track;

/// Source of tracks grouped by tempo bucket
pub trait TrackCatalog {
    /// Tracks filed under `bucket`. A missing bucket yields an empty list.
    fn tracks(&self, bucket: u32) -> Result<Vec<Track>, CatalogError>;
}

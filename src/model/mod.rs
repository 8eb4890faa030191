//! Data model shared by the live pipeline and its collaborators
//!
//! Samples come in from the wire, tracks come out of the catalog, and the
//! selection state ties a measured rate to the track picked for it.

mod sample;
mod selection;
mod track;

pub use sample::{stamp_batch, RawSample, Sample};
pub use selection::{Selection, SelectionState};
pub use track::{Track, TrackMetadata};

//! Tempo side of the live pipeline: rate to bucket, bucket to track

mod matcher;
mod selector;

pub use matcher::{match_tempo, TempoBuckets};
pub use selector::TrackSelector;

use super::Track;
use chrono::{DateTime, Utc};

/// Outcome of picking a track for a matched bucket
///
/// `NoMatch` is a normal result (bucket missing or empty), not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Track(Track),
    NoMatch,
}

impl Selection {
    pub fn track(&self) -> Option<&Track> {
        match self {
            Selection::Track(t) => Some(t),
            Selection::NoMatch => None,
        }
    }

    pub fn into_track(self) -> Option<Track> {
        match self {
            Selection::Track(t) => Some(t),
            Selection::NoMatch => None,
        }
    }
}

/// Last computed result of the live pipeline, shared with the query path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Jumps per minute from the most recent batch
    pub last_rate: f64,

    /// Bucket the rate matched, if matching ran
    pub last_bucket: Option<u32>,

    pub last_track: Option<Track>,

    /// When the state was last written (None until the first batch)
    pub selected_at: Option<DateTime<Utc>>,
}

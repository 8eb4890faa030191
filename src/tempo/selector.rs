//! Random track choice within a matched bucket

use crate::catalog::TrackCatalog;
use crate::error::CatalogError;
use crate::model::Selection;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Picks tracks uniformly at random from a bucket's catalog
///
/// Calls are independent: there is no memory of earlier picks, so the same
/// track can come up twice in a row.
pub struct TrackSelector<R: Rng = StdRng> {
    rng: R,
}

impl TrackSelector<StdRng> {
    /// Selector seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible selector
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> TrackSelector<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Pick one track from `bucket`, or `NoMatch` if it has none
    pub fn select<C: TrackCatalog + ?Sized>(
        &mut self,
        bucket: u32,
        catalog: &C,
    ) -> Result<Selection, CatalogError> {
        let tracks = catalog.tracks(bucket)?;

        match tracks.choose(&mut self.rng) {
            Some(track) => {
                log::info!("Selected {} from {} track(s) at {} bpm", track.id, tracks.len(), bucket);
                Ok(Selection::Track(track.clone()))
            }
            None => {
                log::info!("No tracks available at {} bpm", bucket);
                Ok(Selection::NoMatch)
            }
        }
    }
}

//! Nearest-bucket tempo matching

use crate::error::ConfigurationError;

/// Non-empty, ordered set of supported tempos (bpm)
///
/// Declaration order matters: it breaks ties in [`TempoBuckets::nearest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempoBuckets {
    bpms: Vec<u32>,
}

impl TempoBuckets {
    pub fn new(bpms: Vec<u32>) -> Result<Self, ConfigurationError> {
        if bpms.is_empty() {
            return Err(ConfigurationError::EmptyTempoBuckets);
        }
        Ok(Self { bpms })
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bpms
    }

    /// Bucket with the smallest `|bucket - rate|`
    ///
    /// Exact ties go to the earliest-declared bucket.
    pub fn nearest(&self, rate: f64) -> u32 {
        let mut best = self.bpms[0];
        let mut best_distance = (best as f64 - rate).abs();

        for &bpm in &self.bpms[1..] {
            let distance = (bpm as f64 - rate).abs();
            if distance < best_distance {
                best = bpm;
                best_distance = distance;
            }
        }

        best
    }
}

/// Match `rate` against `buckets`, failing only when the set is empty
pub fn match_tempo(rate: f64, buckets: &[u32]) -> Result<u32, ConfigurationError> {
    Ok(TempoBuckets::new(buckets.to_vec())?.nearest(rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> TempoBuckets {
        TempoBuckets::new(vec![104, 120, 130, 140]).unwrap()
    }

    #[test]
    fn test_nearest_bucket() {
        let buckets = defaults();
        assert_eq!(buckets.nearest(0.0), 104);
        assert_eq!(buckets.nearest(118.0), 120);
        assert_eq!(buckets.nearest(134.9), 130);
        assert_eq!(buckets.nearest(500.0), 140);
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(defaults().nearest(130.0), 130);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        assert_eq!(match_tempo(112.0, &[104, 120]).unwrap(), 104);
        assert_eq!(match_tempo(112.0, &[120, 104]).unwrap(), 120);
        assert_eq!(match_tempo(125.0, &[104, 120, 130, 140]).unwrap(), 120);
    }

    #[test]
    fn test_result_is_member() {
        let buckets = defaults();
        for rate in [-10.0, 0.0, 55.5, 112.0, 127.3, 1e6] {
            assert!(buckets.as_slice().contains(&buckets.nearest(rate)));
        }
    }

    #[test]
    fn test_empty_buckets_is_configuration_error() {
        assert_eq!(
            match_tempo(120.0, &[]),
            Err(ConfigurationError::EmptyTempoBuckets)
        );
    }
}

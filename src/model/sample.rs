use crate::error::MalformedInputError;
use serde::{Deserialize, Serialize};

/// One accelerometer reading, stamped by the server on arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

/// Sample record as it arrives on the wire, before validation
///
/// Only `z` feeds the jump detector, so it is the one field a batch entry
/// cannot omit. `x` and `y` default to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl RawSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

/// Validate a whole batch and stamp it with `timestamp`
///
/// All-or-nothing: the first entry missing `z` rejects the batch.
pub fn stamp_batch(raw: &[RawSample], timestamp: f64) -> Result<Vec<Sample>, MalformedInputError> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            let z = entry
                .z
                .ok_or(MalformedInputError::MissingField { index, field: "z" })?;
            Ok(Sample {
                x: entry.x.unwrap_or(0.0),
                y: entry.y.unwrap_or(0.0),
                z,
                timestamp,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_batch_assigns_timestamp() {
        let raw = vec![RawSample::new(0.1, 0.2, 0.3), RawSample::new(0.0, 0.0, -1.0)];
        let samples = stamp_batch(&raw, 42.5).unwrap();

        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.timestamp == 42.5));
        assert_eq!(samples[1].z, -1.0);
    }

    #[test]
    fn test_missing_z_rejects_batch() {
        let raw = vec![
            RawSample::new(0.0, 0.0, 1.0),
            RawSample {
                x: Some(1.0),
                y: Some(1.0),
                z: None,
            },
        ];

        let err = stamp_batch(&raw, 0.0).unwrap_err();
        assert_eq!(err, MalformedInputError::MissingField { index: 1, field: "z" });
    }

    #[test]
    fn test_missing_xy_default_to_zero() {
        let raw: Vec<RawSample> = serde_json::from_str(r#"[{"z": 0.5}]"#).unwrap();
        let samples = stamp_batch(&raw, 1.0).unwrap();
        assert_eq!(samples[0].x, 0.0);
        assert_eq!(samples[0].y, 0.0);
    }
}

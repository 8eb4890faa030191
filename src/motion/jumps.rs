//! Rising-edge jump detection on the z axis

/// Jumps found in one scan of a z sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpDetection {
    /// Sample indices at which a jump fired, ascending
    pub indices: Vec<usize>,
}

impl JumpDetection {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Detect upward threshold crossings with debounce
///
/// A jump fires at `i` when `z[i-1] < threshold <= z[i]` and at least
/// `min_interval` samples have passed since the previous jump. The first
/// qualifying crossing always fires.
///
/// `min_interval` counts sample indices, not seconds, so the effective
/// debounce time depends on the client's sampling rate.
pub fn detect_jumps(z: &[f64], threshold: f64, min_interval: usize) -> JumpDetection {
    let min_interval = min_interval as i64;
    let mut last_jump = -min_interval;
    let mut indices = Vec::new();

    for i in 1..z.len() {
        let crossed = z[i - 1] < threshold && threshold <= z[i];
        if crossed && (i as i64 - last_jump) >= min_interval {
            indices.push(i);
            last_jump = i as i64;
        }
    }

    log::debug!("Detected jump indices: {:?}", indices);

    JumpDetection { indices }
}

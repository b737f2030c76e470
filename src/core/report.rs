use std::fmt;
use crate::core::measure::BASELINE_DTYPE;

/// Savings of a measured footprint against the 64-bit baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub elements: usize,
    pub measured_bytes: u128,
    pub baseline_bytes: u128,
}

impl Comparison {
    pub fn new(elements: usize, measured_bytes: u64) -> Self {
        Self {
            elements,
            measured_bytes: measured_bytes as u128,
            baseline_bytes: elements as u128 * BASELINE_DTYPE.width_bytes() as u128,
        }
    }

    pub fn saved_bytes(&self) -> i128 {
        self.baseline_bytes as i128 - self.measured_bytes as i128
    }

    /// `None` when the baseline is empty and a percentage has no meaning.
    pub fn saved_percent(&self) -> Option<f64> {
        if self.baseline_bytes == 0 {
            return None;
        }
        Some(self.saved_bytes() as f64 / self.baseline_bytes as f64 * 100.0)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.saved_percent() {
            Some(percent) => write!(
                f,
                "Memory saved: {} bytes ({:.2}%) compared to {}.",
                self.saved_bytes(),
                percent,
                BASELINE_DTYPE
            ),
            None => write!(
                f,
                "Memory saved: {} bytes (N/A, empty array) compared to {}.",
                self.saved_bytes(),
                BASELINE_DTYPE
            ),
        }
    }
}

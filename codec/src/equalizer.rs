//! Channel Phase Compensation
//!
//! Optional post-transform correction hook. A single unit-magnitude
//! rotation, estimated from a pilot point, is applied to the whole
//! frequency-domain buffer before demapping.

use num_complex::Complex64;

/// Phase compensator applying one rotation to a constellation buffer.
#[derive(Debug, Clone)]
pub struct PhaseCompensator {
    rotation: Complex64,
}

impl PhaseCompensator {
    /// Identity compensator (no rotation)
    pub fn new() -> Self {
        Self {
            rotation: Complex64::new(1.0, 0.0),
        }
    }

    /// Estimate the rotation that maps an observed pilot onto its expected
    /// value. Zero-magnitude pilots leave the current estimate untouched.
    pub fn estimate(&mut self, observed: Complex64, expected: Complex64) {
        if observed.norm() > 0.0 && expected.norm() > 0.0 {
            let ratio = expected / observed;
            self.rotation = ratio / ratio.norm();
        }
    }

    /// Current phase correction in radians
    pub fn phase(&self) -> f64 {
        self.rotation.arg()
    }

    /// Rotate every point in the buffer by the current estimate.
    pub fn compensate(&self, points: &mut [Complex64]) {
        for point in points {
            *point *= self.rotation;
        }
    }
}

impl Default for PhaseCompensator {
    fn default() -> Self {
        Self::new()
    }
}

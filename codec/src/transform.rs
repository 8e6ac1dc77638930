//! Transform Engine Adapter
//!
//! Thin wrapper over the external FFT library. Plans for both directions are
//! built once at construction together with one complex staging buffer and
//! the planner-reported scratch space, keeping the per-symbol path
//! allocation-free.
//!
//! On transmit the QAM mapper fills the staging buffer with constellation
//! points and the inverse transform writes interleaved real/imaginary pairs
//! into a caller-supplied destination. On receive the Nyquist demodulator
//! fills the staging buffer with time-domain samples; the forward transform
//! runs in place and, after normalization, the buffer holds the
//! constellation points for the demapper.

use crate::CodecError;
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::debug;

pub struct Transform {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    /// Shared staging buffer; transforms run in place, so input and output
    /// alias the same storage.
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl Transform {
    pub fn new(size: usize) -> Result<Self, CodecError> {
        if size == 0 {
            return Err(CodecError::InvalidConfiguration(
                "transform size must be at least 1".to_string(),
            ));
        }

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        debug!("planned {}-point transforms, {} scratch samples", size, scratch_len);

        Ok(Self {
            size,
            forward,
            inverse,
            buffer: vec![Complex64::zero(); size],
            scratch: vec![Complex64::zero(); scratch_len],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Staging buffer view for producers: the QAM mapper on transmit, the
    /// Nyquist demodulator on receive.
    pub fn input_mut(&mut self) -> &mut [Complex64] {
        &mut self.buffer
    }

    /// Staging buffer view for consumers, valid after a transform.
    pub fn output(&self) -> &[Complex64] {
        &self.buffer
    }

    /// Inverse transform of the staging buffer, written into `dest` as
    /// interleaved real/imaginary pairs. `dest` must hold exactly twice the
    /// transform size.
    pub fn inverse_into_interleaved(&mut self, dest: &mut [f64]) -> Result<(), CodecError> {
        if dest.len() != self.size * 2 {
            return Err(CodecError::LengthMismatch {
                expected: self.size * 2,
                got: dest.len(),
            });
        }

        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (i, sample) in self.buffer.iter().enumerate() {
            dest[2 * i] = sample.re;
            dest[2 * i + 1] = sample.im;
        }
        Ok(())
    }

    /// Forward transform of the staging buffer, in place.
    pub fn forward_in_place(&mut self) {
        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
    }

    /// Scale the staging buffer by 1/N, undoing the gain of the
    /// unnormalized forward/inverse transform pair.
    pub fn normalize(&mut self) {
        let scale = 1.0 / self.size as f64;
        for sample in &mut self.buffer {
            *sample *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_forward_identity() {
        let size = 16;
        let mut transform = Transform::new(size).unwrap();
        let points: Vec<Complex64> = (0..size)
            .map(|i| Complex64::new((i as f64).cos(), (i as f64 * 0.7).sin()))
            .collect();
        transform.input_mut().copy_from_slice(&points);

        let mut time = vec![0.0; size * 2];
        transform.inverse_into_interleaved(&mut time).unwrap();

        // Feed the time-domain pairs back, as the receive path does
        for (i, sample) in transform.input_mut().iter_mut().enumerate() {
            *sample = Complex64::new(time[2 * i], time[2 * i + 1]);
        }
        transform.forward_in_place();
        transform.normalize();

        for (a, b) in points.iter().zip(transform.output()) {
            assert!((a - b).norm() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_destination_length_checked() {
        let mut transform = Transform::new(8).unwrap();
        let mut short = vec![0.0; 15];
        assert!(matches!(
            transform.inverse_into_interleaved(&mut short),
            Err(CodecError::LengthMismatch { expected: 16, got: 15 })
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Transform::new(0),
            Err(CodecError::InvalidConfiguration(_))
        ));
    }
}

//! Quadrature Nyquist Modulator
//!
//! Upsamples the frequency-transform output by a factor of 2 by interleaving
//! the in-phase and quadrature components with alternating sign:
//!
//! `+Re(c(n)), +Im(c(n)), -Re(c(n+1)), -Im(c(n+1))`
//!
//! The demodulator inverts this, recombining real/imaginary pairs from the
//! receive ring buffer into transform input samples.

use crate::CodecError;
use common::types::OfdmSettings;
use num_complex::Complex64;
use tracing::debug;

/// Per-instance state, present only while the modulator is configured.
struct NyquistState {
    n_points: usize,
    /// Sign multiplier per complex sample: starts at +1 at the beginning of
    /// every symbol and flips once per sample. Covers both FFT-size
    /// parities: for even sizes it yields the paired
    /// `+,+,-,-` interleave, for odd sizes the per-sample alternation.
    signs: Vec<f64>,
}

/// Digital Nyquist quadrature modulator and demodulator.
///
/// Operations are only valid on a configured instance; `configure` and
/// `close` move between the unconfigured and ready states.
pub struct NyquistModulator {
    state: Option<NyquistState>,
}

impl NyquistModulator {
    /// Create an unconfigured modulator; call [`configure`](Self::configure)
    /// before use.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Create a modulator configured from a settings snapshot.
    pub fn with_settings(settings: &OfdmSettings) -> Result<Self, CodecError> {
        let mut modulator = Self::new();
        modulator.configure(settings.fft_size)?;
        Ok(modulator)
    }

    /// Bind the point count and build the sign table, marking the instance
    /// ready.
    pub fn configure(&mut self, n_points: usize) -> Result<(), CodecError> {
        if n_points == 0 {
            return Err(CodecError::InvalidConfiguration(
                "fft size must be at least 1".to_string(),
            ));
        }
        let signs = (0..n_points)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        self.state = Some(NyquistState { n_points, signs });
        debug!("Nyquist modulator configured for {} points", n_points);
        Ok(())
    }

    /// Drop the configuration, returning the instance to the unconfigured
    /// state. Subsequent operations fail until `configure` is called again.
    pub fn close(&mut self) {
        self.state = None;
        debug!("Nyquist modulator closed");
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    fn state(&self) -> Result<&NyquistState, CodecError> {
        self.state.as_ref().ok_or(CodecError::NotConfigured)
    }

    /// Modulate `n` complex samples into `2n` interleaved real samples.
    pub fn modulate(&self, input: &[Complex64], output: &mut [f64]) -> Result<(), CodecError> {
        let state = self.state()?;
        if input.len() != state.n_points {
            return Err(CodecError::LengthMismatch {
                expected: state.n_points,
                got: input.len(),
            });
        }
        check_output_len(output.len(), state.n_points * 2)?;

        for (i, (sample, &sign)) in input.iter().zip(&state.signs).enumerate() {
            output[2 * i] = sign * sample.re;
            output[2 * i + 1] = sign * sample.im;
        }
        Ok(())
    }

    /// In-place variant of [`modulate`](Self::modulate) over a buffer that
    /// already holds raw interleaved real/imaginary pairs, as written by the
    /// transform engine. Only the negative-sign pairs are touched; the rest
    /// of the buffer is already in its final form.
    pub fn modulate_in_place(&self, buffer: &mut [f64]) -> Result<(), CodecError> {
        let state = self.state()?;
        check_output_len(buffer.len(), state.n_points * 2)?;

        for (i, &sign) in state.signs.iter().enumerate() {
            if sign < 0.0 {
                buffer[2 * i] = -buffer[2 * i];
                buffer[2 * i + 1] = -buffer[2 * i + 1];
            }
        }
        Ok(())
    }

    /// Demodulate `2n` real samples read from the receive ring buffer into
    /// `n` complex transform input samples, starting at the absolute index
    /// `offset`. Reads wrap around the end of `rx`, so a symbol may straddle
    /// the ring boundary.
    pub fn demodulate(
        &self,
        rx: &[f64],
        offset: usize,
        output: &mut [Complex64],
    ) -> Result<(), CodecError> {
        let state = self.state()?;
        if output.len() != state.n_points {
            return Err(CodecError::LengthMismatch {
                expected: state.n_points,
                got: output.len(),
            });
        }
        if offset >= rx.len() || rx.len() < state.n_points * 2 {
            return Err(CodecError::OffsetOutOfRange {
                offset,
                len: rx.len(),
            });
        }

        let mut j = offset;
        for (sample, &sign) in output.iter_mut().zip(&state.signs) {
            let re = rx[j];
            j = (j + 1) % rx.len();
            let im = rx[j];
            j = (j + 1) % rx.len();
            *sample = Complex64::new(sign * re, sign * im);
        }
        Ok(())
    }
}

impl Default for NyquistModulator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_output_len(got: usize, expected: usize) -> Result<(), CodecError> {
    if got != expected {
        return Err(CodecError::LengthMismatch { expected, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(n: usize) -> NyquistModulator {
        let mut modulator = NyquistModulator::new();
        modulator.configure(n).unwrap();
        modulator
    }

    fn test_vector(n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|i| Complex64::new(i as f64 * 0.5 - 1.0, 2.0 - i as f64 * 0.25))
            .collect()
    }

    #[test]
    fn test_even_sign_pattern() {
        let modulator = configured(4);
        let input = [
            Complex64::new(1.0, 2.0),
            Complex64::new(3.0, 4.0),
            Complex64::new(5.0, 6.0),
            Complex64::new(7.0, 8.0),
        ];
        let mut output = [0.0; 8];
        modulator.modulate(&input, &mut output).unwrap();
        assert_eq!(output, [1.0, 2.0, -3.0, -4.0, 5.0, 6.0, -7.0, -8.0]);
    }

    #[test]
    fn test_odd_sign_pattern() {
        let modulator = configured(3);
        let input = [Complex64::new(1.0, 1.0); 3];
        let mut output = [0.0; 6];
        modulator.modulate(&input, &mut output).unwrap();
        assert_eq!(output, [1.0, 1.0, -1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_round_trip() {
        for n in [1, 2, 3, 64] {
            let modulator = configured(n);
            let input = test_vector(n);
            let mut time = vec![0.0; n * 2];
            modulator.modulate(&input, &mut time).unwrap();

            let mut recovered = vec![Complex64::new(0.0, 0.0); n];
            modulator.demodulate(&time, 0, &mut recovered).unwrap();
            for (a, b) in input.iter().zip(&recovered) {
                assert!((a - b).norm() < 1e-9, "n={}: {} != {}", n, a, b);
            }
        }
    }

    #[test]
    fn test_in_place_matches_copy() {
        for n in [3, 8] {
            let modulator = configured(n);
            let input = test_vector(n);

            let mut copied = vec![0.0; n * 2];
            modulator.modulate(&input, &mut copied).unwrap();

            // Raw interleave without signs, as the transform engine writes it
            let mut in_place = vec![0.0; n * 2];
            for (i, sample) in input.iter().enumerate() {
                in_place[2 * i] = sample.re;
                in_place[2 * i + 1] = sample.im;
            }
            modulator.modulate_in_place(&mut in_place).unwrap();

            assert_eq!(copied, in_place);
        }
    }

    #[test]
    fn test_demodulate_wraps_around_ring() {
        let modulator = configured(2);
        let input = [Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)];
        let mut symbol = [0.0; 4];
        modulator.modulate(&input, &mut symbol).unwrap();

        // Place the symbol at offset 6 of an 8-sample ring so it wraps
        let mut ring = [0.0; 8];
        for (i, &s) in symbol.iter().enumerate() {
            ring[(6 + i) % ring.len()] = s;
        }

        let mut recovered = [Complex64::new(0.0, 0.0); 2];
        modulator.demodulate(&ring, 6, &mut recovered).unwrap();
        assert_eq!(recovered, input);
    }

    #[test]
    fn test_not_configured() {
        let modulator = NyquistModulator::new();
        let input = [Complex64::new(1.0, 1.0)];
        let mut output = [0.0; 2];
        assert!(matches!(
            modulator.modulate(&input, &mut output),
            Err(CodecError::NotConfigured)
        ));

        let mut modulator = configured(1);
        modulator.close();
        assert!(!modulator.is_configured());
        assert!(matches!(
            modulator.modulate_in_place(&mut output),
            Err(CodecError::NotConfigured)
        ));
        let mut complex = [Complex64::new(0.0, 0.0)];
        assert!(matches!(
            modulator.demodulate(&output, 0, &mut complex),
            Err(CodecError::NotConfigured)
        ));
    }

    #[test]
    fn test_zero_points_rejected() {
        let mut modulator = NyquistModulator::new();
        assert!(matches!(
            modulator.configure(0),
            Err(CodecError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_offset_out_of_range() {
        let modulator = configured(2);
        let ring = [0.0; 4];
        let mut output = [Complex64::new(0.0, 0.0); 2];
        assert!(matches!(
            modulator.demodulate(&ring, 4, &mut output),
            Err(CodecError::OffsetOutOfRange { offset: 4, len: 4 })
        ));

        // Ring shorter than one symbol body is also a bounds error
        let short = [0.0; 3];
        assert!(matches!(
            modulator.demodulate(&short, 0, &mut output),
            Err(CodecError::OffsetOutOfRange { .. })
        ));
    }
}

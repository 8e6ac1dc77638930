//! QAM Mapping
//!
//! Maps payload bytes onto square-QAM constellation points, one point per
//! carrier, and hard-decides received points back into bytes. Bits are
//! Gray-coded per axis so a one-level decision error costs a single bit.

use crate::CodecError;
use common::types::{Constellation, OfdmSettings};
use common::utils::{pack_bits, unpack_bits};
use num_complex::Complex64;
use num_traits::Zero;

/// QAM mapper/demapper for one OFDM symbol of `fft_size` carriers.
pub struct QamMapper {
    n_points: usize,
    constellation: Constellation,
}

impl QamMapper {
    pub fn new(settings: &OfdmSettings) -> Result<Self, CodecError> {
        if settings.fft_size == 0 {
            return Err(CodecError::InvalidConfiguration(
                "fft size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            n_points: settings.fft_size,
            constellation: settings.constellation,
        })
    }

    /// Largest payload that fits in one symbol
    pub fn max_bytes(&self) -> usize {
        self.n_points * self.constellation.bits_per_point() / 8
    }

    /// Map `n_bytes` of `input` onto constellation points in `dest`.
    /// Carriers beyond the payload are zeroed.
    pub fn modulate(
        &self,
        input: &[u8],
        dest: &mut [Complex64],
        n_bytes: usize,
    ) -> Result<(), CodecError> {
        if dest.len() != self.n_points {
            return Err(CodecError::LengthMismatch {
                expected: self.n_points,
                got: dest.len(),
            });
        }
        if n_bytes > input.len() {
            return Err(CodecError::LengthMismatch {
                expected: n_bytes,
                got: input.len(),
            });
        }
        if n_bytes > self.max_bytes() {
            return Err(CodecError::PayloadTooLarge {
                bytes: n_bytes,
                max: self.max_bytes(),
            });
        }

        let bits = unpack_bits(&input[..n_bytes]);
        let bits_per_axis = self.constellation.bits_per_axis();
        let mut points = bits.chunks(self.constellation.bits_per_point());
        for carrier in dest.iter_mut() {
            *carrier = match points.next() {
                Some(chunk) => Complex64::new(
                    axis_level(&chunk[..bits_per_axis]),
                    axis_level(&chunk[bits_per_axis..]),
                ),
                None => Complex64::zero(),
            };
        }
        Ok(())
    }

    /// Hard-decide constellation points back into `n_bytes` of `output`.
    pub fn demodulate(
        &self,
        src: &[Complex64],
        output: &mut [u8],
        n_bytes: usize,
    ) -> Result<(), CodecError> {
        if src.len() != self.n_points {
            return Err(CodecError::LengthMismatch {
                expected: self.n_points,
                got: src.len(),
            });
        }
        if n_bytes > output.len() {
            return Err(CodecError::LengthMismatch {
                expected: n_bytes,
                got: output.len(),
            });
        }
        if n_bytes > self.max_bytes() {
            return Err(CodecError::PayloadTooLarge {
                bytes: n_bytes,
                max: self.max_bytes(),
            });
        }

        let n_bits = n_bytes * 8;
        let bits_per_axis = self.constellation.bits_per_axis();
        let n_carriers = n_bits.div_ceil(self.constellation.bits_per_point());
        let mut bits = Vec::with_capacity(n_bits);
        for point in &src[..n_carriers] {
            axis_bits(point.re, bits_per_axis, &mut bits);
            axis_bits(point.im, bits_per_axis, &mut bits);
        }
        let packed = pack_bits(&bits);
        output[..n_bytes].copy_from_slice(&packed[..n_bytes]);
        Ok(())
    }
}

/// Gray-coded amplitude for one axis: 1 bit selects +/-1, 2 bits select one
/// of -3, -1, +1, +3.
fn axis_level(bits: &[bool]) -> f64 {
    match *bits {
        [b] => {
            if b {
                1.0
            } else {
                -1.0
            }
        }
        [b1, b0] => match (b1, b0) {
            (false, false) => -3.0,
            (false, true) => -1.0,
            (true, true) => 1.0,
            (true, false) => 3.0,
        },
        _ => 0.0,
    }
}

/// Hard decision for one axis, inverse of [`axis_level`].
fn axis_bits(value: f64, bits_per_axis: usize, bits: &mut Vec<bool>) {
    match bits_per_axis {
        1 => bits.push(value > 0.0),
        _ => {
            if value < -2.0 {
                bits.extend([false, false]);
            } else if value < 0.0 {
                bits.extend([false, true]);
            } else if value < 2.0 {
                bits.extend([true, true]);
            } else {
                bits.extend([true, false]);
            }
        }
    }
}

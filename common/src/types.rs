//! Common Types for the OFDM Modem
//!
//! Defines the settings snapshot shared by every codec component.

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Constellation order for QAM mapping.
///
/// The discriminant is the number of bits carried per constellation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum Constellation {
    /// QAM-4 (QPSK), 2 bits per point
    Qam4 = 2,
    /// QAM-16, 4 bits per point
    Qam16 = 4,
}

impl Constellation {
    /// Number of bits carried by one constellation point
    pub fn bits_per_point(&self) -> usize {
        *self as usize
    }

    /// Number of bits carried per I/Q axis
    pub fn bits_per_axis(&self) -> usize {
        self.bits_per_point() / 2
    }
}

/// OFDM codec settings.
///
/// Immutable for the lifetime of a codec instance; every collaborator is
/// constructed from the same snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfdmSettings {
    /// FFT size (number of constellation points per symbol)
    pub fft_size: usize,
    /// Cyclic prefix length in time-domain samples
    pub prefix_len: usize,
    /// Constellation order used by the QAM mapper
    pub constellation: Constellation,
}

impl OfdmSettings {
    /// Time-domain symbol body length: the quadrature modulator upsamples
    /// by 2, so the body is always twice the FFT size
    pub fn symbol_len(&self) -> usize {
        self.fft_size * 2
    }

    /// Total length of one prefixed symbol, prefix region included
    pub fn prefixed_symbol_len(&self) -> usize {
        self.symbol_len() + self.prefix_len
    }

    /// Largest payload that fits in one symbol at the configured order
    pub fn max_bytes_per_symbol(&self) -> usize {
        self.fft_size * self.constellation.bits_per_point() / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constellation_bits() {
        assert_eq!(Constellation::Qam4.bits_per_point(), 2);
        assert_eq!(Constellation::Qam16.bits_per_point(), 4);
        assert_eq!(Constellation::Qam16.bits_per_axis(), 2);
    }

    #[test]
    fn test_derived_lengths() {
        let settings = OfdmSettings {
            fft_size: 64,
            prefix_len: 16,
            constellation: Constellation::Qam4,
        };
        assert_eq!(settings.symbol_len(), 128);
        assert_eq!(settings.prefixed_symbol_len(), 144);
        assert_eq!(settings.max_bytes_per_symbol(), 16);
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: OfdmSettings = toml::from_str(
            r#"
            fft_size = 1024
            prefix_len = 256
            constellation = "Qam16"
            "#,
        )
        .unwrap();
        assert_eq!(settings.fft_size, 1024);
        assert_eq!(settings.prefix_len, 256);
        assert_eq!(settings.constellation, Constellation::Qam16);
    }
}

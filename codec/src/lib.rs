//! OFDM Physical-Layer Codec Library
//!
//! This crate converts a byte stream into a transmittable real-valued
//! baseband waveform and back: QAM mapping, inverse/forward transform,
//! quadrature (Nyquist) interleaving and cyclic-prefix framing on transmit,
//! and the ring-buffer-driven inverse pipeline on receive.

pub mod cyclic_prefix;
pub mod equalizer;
pub mod nyquist;
pub mod ofdm;
pub mod qam;
pub mod sync;
pub mod transform;

// Re-export commonly used types
pub use cyclic_prefix::{add_cyclic_prefix, strip_cyclic_prefix};
pub use equalizer::PhaseCompensator;
pub use nyquist::NyquistModulator;
pub use ofdm::OfdmCodec;
pub use qam::QamMapper;
pub use sync::{PrefixSync, RingBuffer, SymbolSync};
pub use transform::Transform;

use thiserror::Error;

/// Errors reported by the codec and its components
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("modulator is not configured")]
    NotConfigured,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("ring buffer offset {offset} out of range for {len} samples")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("prefix length {prefix} larger than symbol body of {body} samples")]
    PrefixTooLong { prefix: usize, body: usize },

    #[error("buffer length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("payload of {bytes} bytes does not fit in one symbol (max {max})")]
    PayloadTooLarge { bytes: usize, max: usize },
}

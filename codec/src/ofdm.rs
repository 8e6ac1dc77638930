//! OFDM Symbol Codec
//!
//! Sequences the collaborators into the transmit and receive pipelines:
//!
//! - transmit: QAM map -> inverse transform -> Nyquist modulate -> cyclic
//!   prefix
//! - receive: boundary location -> Nyquist demodulate -> forward transform
//!   -> normalize -> optional phase compensation -> QAM demap
//!
//! The codec holds no modulation logic of its own beyond buffer and offset
//! bookkeeping; all per-symbol buffers are owned sub-objects allocated once
//! at construction.

use crate::cyclic_prefix::add_cyclic_prefix;
use crate::equalizer::PhaseCompensator;
use crate::nyquist::NyquistModulator;
use crate::qam::QamMapper;
use crate::sync::{PrefixSync, SymbolSync};
use crate::transform::Transform;
use crate::CodecError;
use common::types::OfdmSettings;
use common::utils::bytes_to_hex;
use tracing::{debug, trace};

pub struct OfdmCodec {
    settings: OfdmSettings,
    transform: Transform,
    nyquist: NyquistModulator,
    qam: QamMapper,
    detector: Box<dyn SymbolSync>,
    equalizer: Option<PhaseCompensator>,
    prefixed_symbol_len: usize,
}

impl OfdmCodec {
    /// Create a codec with the cyclic-prefix correlation detector.
    pub fn new(settings: OfdmSettings) -> Result<Self, CodecError> {
        let detector = Box::new(PrefixSync::new(&settings)?);
        Self::with_detector(settings, detector)
    }

    /// Create a codec with a caller-supplied boundary detector.
    pub fn with_detector(
        settings: OfdmSettings,
        detector: Box<dyn SymbolSync>,
    ) -> Result<Self, CodecError> {
        if settings.fft_size == 0 {
            return Err(CodecError::InvalidConfiguration(
                "fft size must be at least 1".to_string(),
            ));
        }
        if settings.prefix_len > settings.symbol_len() {
            return Err(CodecError::PrefixTooLong {
                prefix: settings.prefix_len,
                body: settings.symbol_len(),
            });
        }

        let transform = Transform::new(settings.fft_size)?;
        let nyquist = NyquistModulator::with_settings(&settings)?;
        let qam = QamMapper::new(&settings)?;
        debug!(
            "created OFDM codec: fft_size={}, prefix_len={}, prefixed symbol={} samples",
            settings.fft_size,
            settings.prefix_len,
            settings.prefixed_symbol_len()
        );

        Ok(Self {
            prefixed_symbol_len: settings.prefixed_symbol_len(),
            settings,
            transform,
            nyquist,
            qam,
            detector,
            equalizer: None,
        })
    }

    pub fn settings(&self) -> &OfdmSettings {
        &self.settings
    }

    /// Length of one encoded symbol: prefix plus interleaved body
    pub fn prefixed_symbol_len(&self) -> usize {
        self.prefixed_symbol_len
    }

    /// Install the post-transform phase compensation hook.
    pub fn set_equalizer(&mut self, equalizer: PhaseCompensator) {
        self.equalizer = Some(equalizer);
    }

    pub fn clear_equalizer(&mut self) {
        self.equalizer = None;
    }

    /// Encode one symbol's worth of payload into `output`, which must hold
    /// exactly one prefixed symbol. Pure function of the payload and the
    /// codec configuration; the scratch buffers are fully overwritten on
    /// every call.
    pub fn encode(
        &mut self,
        input: &[u8],
        output: &mut [f64],
        n_bytes: usize,
    ) -> Result<(), CodecError> {
        if output.len() != self.prefixed_symbol_len {
            return Err(CodecError::LengthMismatch {
                expected: self.prefixed_symbol_len,
                got: output.len(),
            });
        }
        let prefix_len = self.settings.prefix_len;

        // QAM encode the payload into the transform staging buffer
        self.qam
            .modulate(input, self.transform.input_mut(), n_bytes)?;
        // Inverse transform straight into the body region of the output
        self.transform
            .inverse_into_interleaved(&mut output[prefix_len..])?;
        // Nyquist modulate the freshly written pairs in place
        self.nyquist.modulate_in_place(&mut output[prefix_len..])?;
        // Frame with the cyclic prefix
        add_cyclic_prefix(output, self.settings.symbol_len(), prefix_len)?;

        trace!("encoded {} bytes into {}-sample symbol", n_bytes, output.len());
        Ok(())
    }

    /// Feed received samples and attempt to decode one symbol.
    ///
    /// Returns `Ok(None)` while the detector cannot locate a symbol
    /// boundary in the accumulated samples; the caller supplies more on
    /// the next call and the output buffer is left untouched. On success
    /// the decoded byte count (always `n_bytes`) is returned.
    pub fn process_rx_buffer(
        &mut self,
        input: &[f64],
        output: &mut [u8],
        n_bytes: usize,
    ) -> Result<Option<usize>, CodecError> {
        self.detector.push_samples(input);
        let Some(symbol_start) = self.detector.find_symbol_start() else {
            return Ok(None);
        };

        // Nyquist demodulate from the ring into the transform staging buffer
        let ring = self.detector.ring();
        self.nyquist
            .demodulate(ring.as_raw(), symbol_start, self.transform.input_mut())?;
        // Forward transform and normalization
        self.transform.forward_in_place();
        self.transform.normalize();
        // Channel correction, when configured
        if let Some(equalizer) = &self.equalizer {
            equalizer.compensate(self.transform.input_mut());
        }
        // Demap into the destination buffer
        self.qam
            .demodulate(self.transform.output(), output, n_bytes)?;

        trace!(
            "decoded {} bytes from offset {}: {}",
            n_bytes,
            symbol_start,
            bytes_to_hex(&output[..n_bytes])
        );
        Ok(Some(n_bytes))
    }
}

//! Symbol Boundary Location
//!
//! The receive side accumulates samples in a fixed-capacity ring buffer and
//! searches it for the start of an OFDM symbol. The detector owns the ring;
//! the codec only ever reads it through the detector's view plus the
//! returned offset.

use crate::CodecError;
use common::types::OfdmSettings;
use tracing::{debug, trace};

/// Ring capacity in prefixed symbols
const RING_SYMBOLS: usize = 4;

/// Correlation metric a candidate window must reach to be accepted
pub const DEFAULT_SYNC_THRESHOLD: f64 = 0.9;

/// Fixed-capacity circular buffer of received real samples.
///
/// Offsets handed out by a detector are absolute indices into the backing
/// storage; reads wrap modulo the capacity.
pub struct RingBuffer {
    data: Vec<f64>,
    head: usize,
    filled: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Result<Self, CodecError> {
        if capacity == 0 {
            return Err(CodecError::InvalidConfiguration(
                "ring buffer capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            data: vec![0.0; capacity],
            head: 0,
            filled: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of valid samples, saturating at the capacity
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Append samples, overwriting the oldest data once full.
    pub fn push_slice(&mut self, samples: &[f64]) {
        for &sample in samples {
            self.data[self.head] = sample;
            self.head = (self.head + 1) % self.data.len();
        }
        self.filled = (self.filled + samples.len()).min(self.data.len());
    }

    /// Absolute index of the oldest valid sample
    pub fn oldest(&self) -> usize {
        (self.head + self.capacity() - self.filled) % self.capacity()
    }

    /// Wrapped read at an absolute index
    pub fn get(&self, index: usize) -> f64 {
        self.data[index % self.data.len()]
    }

    /// Backing storage; indices returned by a detector wrap modulo its
    /// length
    pub fn as_raw(&self) -> &[f64] {
        &self.data
    }
}

/// Locates symbol boundaries within the receive ring buffer.
///
/// Implementations own the ring; `find_symbol_start` may be polled
/// repeatedly as content grows and returns the absolute ring index of the
/// symbol body (the first sample after the cyclic prefix), or `None` while
/// no boundary can be located yet.
pub trait SymbolSync {
    fn push_samples(&mut self, samples: &[f64]);
    fn ring(&self) -> &RingBuffer;
    fn find_symbol_start(&mut self) -> Option<usize>;
}

/// Cyclic-prefix correlation detector.
///
/// Slides a window over the buffered samples and correlates its first
/// `prefix_len` samples against the copy one body-length later; the
/// normalized metric peaks at the true symbol start.
pub struct PrefixSync {
    ring: RingBuffer,
    body_len: usize,
    prefix_len: usize,
    threshold: f64,
}

impl PrefixSync {
    pub fn new(settings: &OfdmSettings) -> Result<Self, CodecError> {
        if settings.fft_size == 0 {
            return Err(CodecError::InvalidConfiguration(
                "fft size must be at least 1".to_string(),
            ));
        }
        let ring = RingBuffer::new(settings.prefixed_symbol_len() * RING_SYMBOLS)?;
        debug!(
            "prefix sync: {}-sample ring, body {}, prefix {}",
            ring.capacity(),
            settings.symbol_len(),
            settings.prefix_len
        );
        Ok(Self {
            ring,
            body_len: settings.symbol_len(),
            prefix_len: settings.prefix_len,
            threshold: DEFAULT_SYNC_THRESHOLD,
        })
    }

    /// Normalized prefix-vs-tail correlation for a window starting at
    /// `start` (the prefix position)
    fn metric_at(&self, start: usize) -> f64 {
        let mut correlation = 0.0;
        let mut power = 0.0;
        for i in 0..self.prefix_len {
            let a = self.ring.get(start + i);
            let b = self.ring.get(start + self.body_len + i);
            correlation += a * b;
            power += a * a + b * b;
        }
        if power > 0.0 {
            2.0 * correlation / power
        } else {
            0.0
        }
    }
}

impl SymbolSync for PrefixSync {
    fn push_samples(&mut self, samples: &[f64]) {
        self.ring.push_slice(samples);
    }

    fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    fn find_symbol_start(&mut self) -> Option<usize> {
        let span = self.prefix_len + self.body_len;
        if self.ring.len() < span {
            trace!(
                "sync miss: {} of {} samples buffered",
                self.ring.len(),
                span
            );
            return None;
        }

        let oldest = self.ring.oldest();
        if self.prefix_len == 0 {
            // Nothing to correlate against; the oldest complete window is
            // taken as the symbol.
            return Some(oldest);
        }

        let mut best_start = 0;
        let mut best_metric = f64::NEG_INFINITY;
        for k in 0..=(self.ring.len() - span) {
            let start = (oldest + k) % self.ring.capacity();
            let metric = self.metric_at(start);
            if metric > best_metric {
                best_metric = metric;
                best_start = start;
            }
        }

        if best_metric < self.threshold {
            trace!("sync miss: best correlation {:.3}", best_metric);
            return None;
        }
        let body_start = (best_start + self.prefix_len) % self.ring.capacity();
        trace!(
            "symbol located: prefix at {}, body at {}, metric {:.3}",
            best_start,
            body_start,
            best_metric
        );
        Some(body_start)
    }
}

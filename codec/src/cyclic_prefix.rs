//! Cyclic Prefix Framing
//!
//! A prefixed symbol buffer is laid out as `[ prefix(P) | body(2N) ]`; the
//! prefix is a copy of the last P samples of the body, giving the receiver
//! tolerance to channel delay spread.

use crate::CodecError;

/// Fill the prefix region of `buffer` with the tail of the symbol body.
///
/// The body occupies `buffer[prefix_len..]` and must be `body_len` samples
/// long. A zero-length prefix is a no-op; a prefix longer than the body is
/// rejected rather than read out of bounds.
pub fn add_cyclic_prefix(
    buffer: &mut [f64],
    body_len: usize,
    prefix_len: usize,
) -> Result<(), CodecError> {
    if prefix_len == 0 {
        return Ok(());
    }
    if prefix_len > body_len {
        return Err(CodecError::PrefixTooLong {
            prefix: prefix_len,
            body: body_len,
        });
    }
    let expected = body_len + prefix_len;
    if buffer.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            got: buffer.len(),
        });
    }

    // The tail of the body starts `prefix_len` samples before its end,
    // which is index `body_len` once the prefix region is accounted for.
    buffer.copy_within(body_len..expected, 0);
    Ok(())
}

/// Strip the prefix from a received symbol, returning the body view.
pub fn strip_cyclic_prefix(buffer: &[f64], prefix_len: usize) -> Result<&[f64], CodecError> {
    if prefix_len >= buffer.len() {
        return Err(CodecError::PrefixTooLong {
            prefix: prefix_len,
            body: buffer.len().saturating_sub(prefix_len),
        });
    }
    Ok(&buffer[prefix_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_equals_body_tail() {
        let body_len = 8;
        let prefix_len = 3;
        let mut buffer = vec![0.0; body_len + prefix_len];
        for (i, sample) in buffer[prefix_len..].iter_mut().enumerate() {
            *sample = i as f64 + 1.0;
        }

        add_cyclic_prefix(&mut buffer, body_len, prefix_len).unwrap();
        assert_eq!(&buffer[..prefix_len], &[6.0, 7.0, 8.0]);
        // Body untouched
        assert_eq!(buffer[prefix_len], 1.0);
        assert_eq!(buffer[prefix_len + body_len - 1], 8.0);
    }

    #[test]
    fn test_zero_prefix_is_noop() {
        let mut buffer = vec![1.0, 2.0, 3.0, 4.0];
        add_cyclic_prefix(&mut buffer, 4, 0).unwrap();
        assert_eq!(buffer, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_prefix_larger_than_body() {
        let mut buffer = vec![0.0; 13];
        assert!(matches!(
            add_cyclic_prefix(&mut buffer, 4, 9),
            Err(CodecError::PrefixTooLong { prefix: 9, body: 4 })
        ));
    }

    #[test]
    fn test_buffer_length_checked() {
        let mut buffer = vec![0.0; 10];
        assert!(matches!(
            add_cyclic_prefix(&mut buffer, 8, 3),
            Err(CodecError::LengthMismatch { expected: 11, got: 10 })
        ));
    }

    #[test]
    fn test_strip_returns_body() {
        let buffer = [9.0, 9.0, 1.0, 2.0, 3.0, 4.0];
        let body = strip_cyclic_prefix(&buffer, 2).unwrap();
        assert_eq!(body, &[1.0, 2.0, 3.0, 4.0]);
        assert!(strip_cyclic_prefix(&buffer, 6).is_err());
    }
}

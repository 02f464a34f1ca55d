//! Compact encodings
//!
//! # Variable-length integers
//!
//! Little-endian groups of 7 bits, continuation bit (0x80) set on every byte
//! but the last. Zero is a single `00` byte. The all-ones patterns
//! (`u64::MAX`, `i64::MAX` and `0xFFFF_FFFF`) are written as the fixed 5-byte
//! escape `FF FF FF FF 0F`, which is also what `0xFFFF_FFFF` produces through
//! the regular loop. Decoding the escape yields `0xFFFF_FFFF`.
//!
//! # Sparse matrices
//!
//! A 16-bit mask with bit `i` set when element `i` (storage order) differs
//! from the identity matrix, followed by only those elements as f32.

use crate::error::{Result, StreamError};

/// Longest variable-length encoding of a u64
pub const MAX_ULEB128_LEN: usize = 10;

/// Fixed encoding of the all-ones sentinels
pub const ULEB128_SENTINEL: [u8; 5] = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F];

/// 4x4 float matrix, 16 elements in storage order
pub type Matrix4 = [f32; 16];

/// Identity matrix
pub const IDENTITY: Matrix4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Mask with every element present
pub const FULL_MATRIX_MASK: u16 = 0xFFFF;

/// Encode `value` into a stack buffer, returning the buffer and used length
pub fn encode_uleb128(value: u64) -> ([u8; MAX_ULEB128_LEN], usize) {
    let mut out = [0u8; MAX_ULEB128_LEN];

    if value == u64::MAX || value == i64::MAX as u64 || value == u32::MAX as u64 {
        out[..ULEB128_SENTINEL.len()].copy_from_slice(&ULEB128_SENTINEL);
        return (out, ULEB128_SENTINEL.len());
    }

    if value == 0 {
        return (out, 1);
    }

    let mut remaining = value;
    let mut len = 0;
    loop {
        let mut byte = (remaining & 0x7F) as u8;
        remaining >>= 7;
        if remaining > 0 {
            byte |= 0x80;
        }
        out[len] = byte;
        len += 1;
        if remaining == 0 {
            break;
        }
    }
    (out, len)
}

/// Decode a variable-length integer from the start of `data`
///
/// Returns the value and the number of bytes consumed. `offset` and `length`
/// only feed the bounds error for a truncated encoding.
pub fn decode_uleb128(data: &[u8], offset: usize, length: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in data.iter().take(MAX_ULEB128_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if data.len() >= MAX_ULEB128_LEN {
        return Err(StreamError::Format(format!(
            "variable-length integer at offset {offset} exceeds {MAX_ULEB128_LEN} bytes"
        )));
    }
    Err(StreamError::Bounds {
        offset,
        requested: data.len() + 1,
        length,
    })
}

/// Presence mask of the elements that differ from identity
pub fn matrix_mask(matrix: &Matrix4) -> u16 {
    let mut mask = 0u16;
    for (i, (value, identity)) in matrix.iter().zip(IDENTITY.iter()).enumerate() {
        if value != identity {
            mask |= 1 << i;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let (buf, len) = encode_uleb128(value);
        buf[..len].to_vec()
    }

    #[test]
    fn test_zero_is_single_byte() {
        assert_eq!(encoded(0), vec![0x00]);
    }

    #[test]
    fn test_small_values() {
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7F]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
    }

    #[test]
    fn test_300_is_two_bytes() {
        // 300 = 0b10_0101100
        assert_eq!(encoded(300), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(encoded(0xFFFF_FFFF), ULEB128_SENTINEL.to_vec());
        assert_eq!(encoded(u64::MAX), ULEB128_SENTINEL.to_vec());
        assert_eq!(encoded(i64::MAX as u64), ULEB128_SENTINEL.to_vec());
    }

    #[test]
    fn test_large_value_uses_loop() {
        let bytes = encoded(1 << 40);
        assert_eq!(bytes.len(), 6);
        assert_eq!(*bytes.last().unwrap(), 0x20);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_uleb128(&[0xAC, 0x02, 0xFF], 0, 3).unwrap(), (300, 2));
        assert_eq!(
            decode_uleb128(&ULEB128_SENTINEL, 0, 5).unwrap(),
            (0xFFFF_FFFF, 5)
        );
    }

    #[test]
    fn test_decode_truncated() {
        let err = decode_uleb128(&[0x80, 0x80], 4, 6).unwrap_err();
        assert!(err.is_bounds());
    }

    #[test]
    fn test_decode_too_long() {
        let data = [0x80u8; 12];
        let err = decode_uleb128(&data, 0, 12).unwrap_err();
        assert!(matches!(err, StreamError::Format(_)));
    }

    #[test]
    fn test_matrix_mask() {
        assert_eq!(matrix_mask(&IDENTITY), 0);

        let mut m = IDENTITY;
        m[12] = 5.0;
        assert_eq!(matrix_mask(&m), 1 << 12);

        m[0] = 2.0;
        assert_eq!(matrix_mask(&m), (1 << 12) | 1);
    }
}

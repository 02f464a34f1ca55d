//! Consuming stream
//!
//! [`ByteReader`] mirrors every [`ByteWriter`](crate::ByteWriter) primitive
//! and applies the same flag-dependent encoding rules. Reads past the end
//! fail with [`StreamError::Bounds`] and leave the cursor unchanged.

use craftkit_core::{CompressionFlags, Guid, Sha1Hash, ValueEnum, SHA1_SIZE};

use crate::compact::{decode_uleb128, Matrix4, FULL_MATRIX_MASK, IDENTITY};
use crate::endian::Endian;
use crate::error::{Result, StreamError};
use crate::seek::{self, SeekMode};

/// Consuming byte cursor over an owned buffer
#[derive(Debug, Clone)]
pub struct ByteReader {
    buffer: Vec<u8>,
    offset: usize,
    flags: CompressionFlags,
    endian: Endian,
}

impl ByteReader {
    /// Create a reader with no compact encodings
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::with_flags(data, CompressionFlags::NONE)
    }

    /// Create a reader with the given flags
    pub fn with_flags(data: impl Into<Vec<u8>>, flags: CompressionFlags) -> Self {
        ByteReader {
            buffer: data.into(),
            offset: 0,
            flags,
            endian: Endian::Big,
        }
    }

    /// Set byte order (builder pattern)
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Set byte order
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Byte order
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Session compression flags
    pub fn flags(&self) -> CompressionFlags {
        self.flags
    }

    /// Cursor position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total stream length
    pub fn length(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Returns true when the cursor is at the end
    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// The whole backing buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Move the cursor
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<()> {
        self.offset = seek::resolve(self.offset, self.buffer.len(), offset, mode)?;
        Ok(())
    }

    fn take(&mut self, requested: usize) -> Result<&[u8]> {
        let start = self.offset;
        let end = start
            .checked_add(requested)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(StreamError::Bounds {
                offset: start,
                requested,
                length: self.buffer.len(),
            })?;
        self.offset = end;
        Ok(&self.buffer[start..end])
    }

    // === Raw bytes ===

    /// Read `size` bytes verbatim
    pub fn bytes(&mut self, size: usize) -> Result<Vec<u8>> {
        Ok(self.take(size)?.to_vec())
    }

    /// Read a length-prefixed byte array
    pub fn byte_array(&mut self) -> Result<Vec<u8>> {
        let count = self.count(1)?;
        self.bytes(count)
    }

    /// Skip `size` bytes
    pub fn pad(&mut self, size: usize) -> Result<()> {
        self.take(size)?;
        Ok(())
    }

    // === Fixed-width primitives ===

    /// Read a one-byte boolean (any non-zero byte is true)
    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    /// Read a signed byte
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    /// Read an unsigned byte
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed 16-bit integer
    pub fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    /// Read an unsigned 16-bit integer
    pub fn u16(&mut self) -> Result<u16> {
        let endian = self.endian;
        Ok(endian.read_u16(self.take(2)?))
    }

    /// Read a 24-bit unsigned integer
    pub fn u24(&mut self) -> Result<u32> {
        let endian = self.endian;
        Ok(endian.read_u24(self.take(3)?))
    }

    // === Compressible integers ===

    /// Read a signed 32-bit integer; compact unless `force` or the flag is off
    pub fn i32(&mut self, force: bool) -> Result<i32> {
        Ok(self.u32(force)? as i32)
    }

    /// Read an unsigned 32-bit integer; compact unless `force` or the flag is off
    pub fn u32(&mut self, force: bool) -> Result<u32> {
        if !force && self.flags.compressed_integers() {
            return Ok(self.uleb128()? as u32);
        }
        let endian = self.endian;
        Ok(endian.read_u32(self.take(4)?))
    }

    /// Read a signed 64-bit integer; compact unless `force` or the flag is off
    pub fn i64(&mut self, force: bool) -> Result<i64> {
        Ok(self.u64(force)? as i64)
    }

    /// Read an unsigned 64-bit integer; compact unless `force` or the flag is off
    pub fn u64(&mut self, force: bool) -> Result<u64> {
        if !force && self.flags.compressed_integers() {
            return self.uleb128();
        }
        let endian = self.endian;
        Ok(endian.read_u64(self.take(8)?))
    }

    /// Read a variable-length integer regardless of flags
    pub fn uleb128(&mut self) -> Result<u64> {
        let (value, used) =
            decode_uleb128(&self.buffer[self.offset..], self.offset, self.buffer.len())?;
        self.offset += used;
        Ok(value)
    }

    /// Read a sequence count and check it against the bytes left, given the
    /// smallest encoded element size
    fn count(&mut self, min_element_size: usize) -> Result<usize> {
        let start = self.offset;
        let raw = self.i32(false)?;
        let count = usize::try_from(raw)
            .map_err(|_| StreamError::Format(format!("negative sequence length {raw} at offset {start}")))?;
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(StreamError::Bounds {
                offset: self.offset,
                requested: needed,
                length: self.buffer.len(),
            });
        }
        Ok(count)
    }

    // === Floating point ===

    /// Read a 32-bit float
    pub fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.u32(true)?))
    }

    /// Read a 2-component float vector
    pub fn vec2(&mut self) -> Result<[f32; 2]> {
        Ok([self.f32()?, self.f32()?])
    }

    /// Read a 3-component float vector
    pub fn vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    /// Read a 4-component float vector
    pub fn vec4(&mut self) -> Result<[f32; 4]> {
        Ok([self.f32()?, self.f32()?, self.f32()?, self.f32()?])
    }

    /// Read a 4x4 matrix; absent cells of a sparse matrix are identity
    pub fn matrix(&mut self) -> Result<Matrix4> {
        let mask = if self.flags.compressed_matrices() {
            self.u16()?
        } else {
            FULL_MATRIX_MASK
        };

        let mut matrix = IDENTITY;
        for (i, element) in matrix.iter_mut().enumerate() {
            if (mask >> i) & 1 != 0 {
                *element = self.f32()?;
            }
        }
        Ok(matrix)
    }

    // === Strings ===

    /// Read a narrow string from a `size`-byte field, dropping trailing NULs
    pub fn str_fixed(&mut self, size: usize) -> Result<String> {
        let raw = self.take(size)?;
        let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Read a UTF-16BE string from a `size`-character field, dropping
    /// trailing NULs
    pub fn wstr_fixed(&mut self, size: usize) -> Result<String> {
        let mut units = self.utf16_units(size)?;
        while units.last() == Some(&0) {
            units.pop();
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Read a length-prefixed narrow string
    ///
    /// Under compact integers the stored length is twice the character
    /// count and is halved here.
    pub fn str(&mut self) -> Result<String> {
        let size = self.string_length(1)?;
        let raw = self.take(size)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Read a length-prefixed UTF-16BE string
    pub fn wstr(&mut self) -> Result<String> {
        let size = self.string_length(2)?;
        let units = self.utf16_units(size)?;
        Ok(String::from_utf16_lossy(&units))
    }

    fn string_length(&mut self, unit_size: usize) -> Result<usize> {
        let start = self.offset;
        let raw = self.i32(false)?;
        let mut size = usize::try_from(raw)
            .map_err(|_| StreamError::Format(format!("negative string length {raw} at offset {start}")))?;
        if self.flags.compressed_integers() {
            if size % 2 != 0 {
                return Err(StreamError::Format(format!(
                    "odd doubled string length {raw} at offset {start}"
                )));
            }
            size /= 2;
        }
        if size.saturating_mul(unit_size) > self.remaining() {
            return Err(StreamError::Bounds {
                offset: self.offset,
                requested: size.saturating_mul(unit_size),
                length: self.buffer.len(),
            });
        }
        Ok(size)
    }

    fn utf16_units(&mut self, count: usize) -> Result<Vec<u16>> {
        let raw = self.take(count.saturating_mul(2))?;
        Ok(raw
            .chunks_exact(2)
            .map(|chunk| Endian::Big.read_u16(chunk))
            .collect())
    }

    // === Identifiers and tags ===

    /// Read a 20-byte SHA1
    pub fn sha1(&mut self) -> Result<Sha1Hash> {
        let mut bytes = [0u8; SHA1_SIZE];
        bytes.copy_from_slice(self.take(SHA1_SIZE)?);
        Ok(Sha1Hash::from_bytes(bytes))
    }

    /// Read a GUID stored as a 32-bit integer
    pub fn guid(&mut self, force: bool) -> Result<Guid> {
        Ok(Guid(self.u32(force)?))
    }

    /// Read a 1-byte enum tag
    pub fn enum8<T: ValueEnum<u8>>(&mut self) -> Result<T> {
        let value = self.u8()?;
        Ok(T::try_from_value(value)?)
    }

    /// Read a 4-byte enum tag
    pub fn enum32<T: ValueEnum<u32>>(&mut self) -> Result<T> {
        let value = self.u32(false)?;
        Ok(T::try_from_value(value)?)
    }

    // === Sequences ===

    /// Read a length-prefixed array of i16
    pub fn i16_array(&mut self) -> Result<Vec<i16>> {
        let count = self.count(2)?;
        (0..count).map(|_| self.i16()).collect()
    }

    /// Read a length-prefixed array of i32
    pub fn i32_array(&mut self) -> Result<Vec<i32>> {
        let count = self.count(1)?;
        (0..count).map(|_| self.i32(false)).collect()
    }

    /// Read a length-prefixed array of i64
    pub fn i64_array(&mut self) -> Result<Vec<i64>> {
        let count = self.count(1)?;
        (0..count).map(|_| self.i64(false)).collect()
    }

    /// Read a length-prefixed array of f32
    pub fn f32_array(&mut self) -> Result<Vec<f32>> {
        let count = self.count(4)?;
        (0..count).map(|_| self.f32()).collect()
    }

    /// Read a length-prefixed array of 1-byte enum tags
    pub fn enum8_array<T: ValueEnum<u8>>(&mut self) -> Result<Vec<T>> {
        let count = self.count(1)?;
        (0..count).map(|_| self.enum8()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteWriter;

    #[test]
    fn test_read_fixed_width() {
        let mut r = ByteReader::new(vec![0xAB, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(r.u8().unwrap(), 0xAB);
        assert_eq!(r.u16().unwrap(), 0x0102);
        assert_eq!(r.u24().unwrap(), 0x030405);
        assert!(r.is_eof());
    }

    #[test]
    fn test_read_past_end_is_bounds_error() {
        let mut r = ByteReader::new(vec![0, 0, 0]);
        let err = r.u32(true).unwrap_err();
        assert_eq!(
            err,
            StreamError::Bounds {
                offset: 0,
                requested: 4,
                length: 3
            }
        );
        assert_eq!(r.offset(), 0);
    }

    #[test]
    fn test_compact_integer_read() {
        let mut r = ByteReader::with_flags(
            vec![0x00, 0xAC, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F],
            CompressionFlags::COMPRESSED_INTEGERS,
        );
        assert_eq!(r.i32(false).unwrap(), 0);
        assert_eq!(r.i32(false).unwrap(), 300);
        assert_eq!(r.i32(false).unwrap(), -1);
    }

    #[test]
    fn test_sparse_matrix_read() {
        let mut r = ByteReader::with_flags(
            vec![0x00, 0x08, 0x40, 0x00, 0x00, 0x00],
            CompressionFlags::COMPRESSED_MATRICES,
        );
        let m = r.matrix().unwrap();
        let mut expected = IDENTITY;
        expected[3] = 2.0;
        assert_eq!(m, expected);
    }

    #[test]
    fn test_doubled_string_length_is_halved() {
        let mut r = ByteReader::with_flags(
            vec![6, b'h', b'e', b'y', 4, 0, b'o', 0, b'k'],
            CompressionFlags::COMPRESSED_INTEGERS,
        );
        assert_eq!(r.str().unwrap(), "hey");
        assert_eq!(r.wstr().unwrap(), "ok");
    }

    #[test]
    fn test_odd_doubled_string_length_is_malformed() {
        let mut r = ByteReader::with_flags(
            vec![7, b'h', b'e', b'y', b'!', 0, 0, 0],
            CompressionFlags::COMPRESSED_INTEGERS,
        );
        assert!(matches!(r.str(), Err(StreamError::Format(_))));
        assert_eq!(r.offset(), 1);
    }

    #[test]
    fn test_fixed_strings_strip_padding() {
        let mut r = ByteReader::new(vec![b'a', b'b', 0, 0, 0, b'c', 0, 0]);
        assert_eq!(r.str_fixed(4).unwrap(), "ab");
        assert_eq!(r.wstr_fixed(2).unwrap(), "c");
    }

    #[test]
    fn test_negative_array_length() {
        let mut r = ByteReader::new(vec![0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(r.i32_array(), Err(StreamError::Format(_))));
    }

    #[test]
    fn test_array_length_exceeding_data() {
        let mut r = ByteReader::new(vec![0x00, 0x10, 0x00, 0x00, 1, 2]);
        assert!(r.byte_array().unwrap_err().is_bounds());
    }

    #[test]
    fn test_unknown_enum_tag() {
        use craftkit_core::SerializationType;
        let mut r = ByteReader::new(vec![b'z']);
        let err = r.enum8::<SerializationType>().unwrap_err();
        assert!(err.is_unknown_type());
    }

    #[test]
    fn test_positions_match_writer() {
        for flags in [CompressionFlags::NONE, CompressionFlags::ALL] {
            let mut w = ByteWriter::with_flags(256, flags);
            let mut positions = Vec::new();
            w.i32(-5, false).unwrap();
            positions.push(w.offset());
            w.u64(1 << 35, false).unwrap();
            positions.push(w.offset());
            w.str("name").unwrap();
            positions.push(w.offset());
            w.f32_array(&[1.5, -2.0]).unwrap();
            positions.push(w.offset());
            w.sha1(&Sha1Hash::of(b"x")).unwrap();
            positions.push(w.offset());

            let mut r = ByteReader::with_flags(w.into_bytes(), flags);
            assert_eq!(r.i32(false).unwrap(), -5);
            assert_eq!(r.offset(), positions[0]);
            assert_eq!(r.u64(false).unwrap(), 1 << 35);
            assert_eq!(r.offset(), positions[1]);
            assert_eq!(r.str().unwrap(), "name");
            assert_eq!(r.offset(), positions[2]);
            assert_eq!(r.f32_array().unwrap(), vec![1.5, -2.0]);
            assert_eq!(r.offset(), positions[3]);
            assert_eq!(r.sha1().unwrap(), Sha1Hash::of(b"x"));
            assert_eq!(r.offset(), positions[4]);
            assert!(r.is_eof());
        }
    }

    #[test]
    fn test_seek_end_then_read_fails() {
        let mut r = ByteReader::new(vec![1, 2, 3]);
        r.seek(0, SeekMode::End).unwrap();
        assert!(r.is_eof());
        assert!(r.u8().unwrap_err().is_bounds());
        r.seek(3, SeekMode::End).unwrap();
        assert_eq!(r.u8().unwrap(), 1);
    }
}

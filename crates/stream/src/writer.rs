//! Producing stream
//!
//! [`ByteWriter`] owns a zero-initialized buffer of fixed capacity. A write
//! that does not fit fails with [`StreamError::Allocation`] instead of
//! growing the buffer: callers size the buffer from an upper-bound estimate,
//! so an overflow means the estimate is wrong.

use craftkit_core::{CompressionFlags, Guid, Sha1Hash, ValueEnum};

use crate::compact::{encode_uleb128, matrix_mask, Matrix4, FULL_MATRIX_MASK};
use crate::endian::Endian;
use crate::error::{Result, StreamError};
use crate::seek::{self, SeekMode};

/// Fixed-capacity producing byte cursor
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>,
    offset: usize,
    flags: CompressionFlags,
    endian: Endian,
}

impl ByteWriter {
    /// Create a writer with `capacity` bytes and no compact encodings
    pub fn new(capacity: usize) -> Self {
        Self::with_flags(capacity, CompressionFlags::NONE)
    }

    /// Create a writer with `capacity` bytes and the given flags
    pub fn with_flags(capacity: usize, flags: CompressionFlags) -> Self {
        ByteWriter {
            buffer: vec![0u8; capacity],
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

    /// Total buffer length
    pub fn length(&self) -> usize {
        self.buffer.len()
    }

    /// The whole backing buffer, including unwritten capacity
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Trim the backing buffer to the bytes written so far
    pub fn shrink(&mut self) {
        self.buffer.truncate(self.offset);
        self.buffer.shrink_to_fit();
    }

    /// Shrink and take the written bytes
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.shrink();
        self.buffer
    }

    /// Move the cursor
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<()> {
        self.offset = seek::resolve(self.offset, self.buffer.len(), offset, mode)?;
        Ok(())
    }

    fn reserve(&mut self, requested: usize) -> Result<&mut [u8]> {
        let start = self.offset;
        let end = start
            .checked_add(requested)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(StreamError::Allocation {
                offset: start,
                requested,
                capacity: self.buffer.len(),
            })?;
        self.offset = end;
        Ok(&mut self.buffer[start..end])
    }

    // === Raw bytes ===

    /// Write bytes verbatim
    pub fn bytes(&mut self, value: &[u8]) -> Result<()> {
        self.reserve(value.len())?.copy_from_slice(value);
        Ok(())
    }

    /// Write a length-prefixed byte array
    pub fn byte_array(&mut self, value: &[u8]) -> Result<()> {
        self.count(value.len())?;
        self.bytes(value)
    }

    /// Write `size` zero bytes
    pub fn pad(&mut self, size: usize) -> Result<()> {
        self.reserve(size)?.fill(0);
        Ok(())
    }

    // === Fixed-width primitives ===

    /// Write a boolean as one byte
    pub fn bool(&mut self, value: bool) -> Result<()> {
        self.u8(u8::from(value))
    }

    /// Write a signed byte
    pub fn i8(&mut self, value: i8) -> Result<()> {
        self.u8(value as u8)
    }

    /// Write an unsigned byte
    pub fn u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    /// Write a signed 16-bit integer
    pub fn i16(&mut self, value: i16) -> Result<()> {
        self.u16(value as u16)
    }

    /// Write an unsigned 16-bit integer
    pub fn u16(&mut self, value: u16) -> Result<()> {
        let endian = self.endian;
        endian.write_u16(self.reserve(2)?, value);
        Ok(())
    }

    /// Write the low 24 bits of `value`
    pub fn u24(&mut self, value: u32) -> Result<()> {
        let endian = self.endian;
        endian.write_u24(self.reserve(3)?, value & 0x00FF_FFFF);
        Ok(())
    }

    // === Compressible integers ===

    /// Write a signed 32-bit integer; compact unless `force` or the flag is off
    pub fn i32(&mut self, value: i32, force: bool) -> Result<()> {
        self.u32(value as u32, force)
    }

    /// Write an unsigned 32-bit integer; compact unless `force` or the flag is off
    pub fn u32(&mut self, value: u32, force: bool) -> Result<()> {
        if !force && self.flags.compressed_integers() {
            return self.uleb128(u64::from(value));
        }
        let endian = self.endian;
        endian.write_u32(self.reserve(4)?, value);
        Ok(())
    }

    /// Write a signed 64-bit integer; compact unless `force` or the flag is off
    pub fn i64(&mut self, value: i64, force: bool) -> Result<()> {
        self.u64(value as u64, force)
    }

    /// Write an unsigned 64-bit integer; compact unless `force` or the flag is off
    pub fn u64(&mut self, value: u64, force: bool) -> Result<()> {
        if !force && self.flags.compressed_integers() {
            return self.uleb128(value);
        }
        let endian = self.endian;
        endian.write_u64(self.reserve(8)?, value);
        Ok(())
    }

    /// Write a variable-length integer regardless of flags
    pub fn uleb128(&mut self, value: u64) -> Result<()> {
        let (buf, len) = encode_uleb128(value);
        self.bytes(&buf[..len])
    }

    fn count(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| StreamError::Format(format!("sequence length {len} exceeds i32")))?;
        self.i32(len, false)
    }

    // === Floating point ===

    /// Write a 32-bit float, always 4 bytes
    pub fn f32(&mut self, value: f32) -> Result<()> {
        self.u32(value.to_bits(), true)
    }

    /// Write a 2-component float vector
    pub fn vec2(&mut self, value: [f32; 2]) -> Result<()> {
        value.iter().try_for_each(|v| self.f32(*v))
    }

    /// Write a 3-component float vector
    pub fn vec3(&mut self, value: [f32; 3]) -> Result<()> {
        value.iter().try_for_each(|v| self.f32(*v))
    }

    /// Write a 4-component float vector
    pub fn vec4(&mut self, value: [f32; 4]) -> Result<()> {
        value.iter().try_for_each(|v| self.f32(*v))
    }

    /// Write a 4x4 matrix, sparse when compact matrices are enabled
    pub fn matrix(&mut self, value: &Matrix4) -> Result<()> {
        let mask = if self.flags.compressed_matrices() {
            let mask = matrix_mask(value);
            self.u16(mask)?;
            mask
        } else {
            FULL_MATRIX_MASK
        };

        for (i, element) in value.iter().enumerate() {
            if (mask >> i) & 1 != 0 {
                self.f32(*element)?;
            }
        }
        Ok(())
    }

    // === Strings ===

    /// Write a narrow string zero-padded to `size` bytes
    pub fn str_fixed(&mut self, value: &str, size: usize) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > size {
            return Err(StreamError::StringTooLong {
                length: bytes.len(),
                size,
            });
        }
        self.bytes(bytes)?;
        self.pad(size - bytes.len())
    }

    /// Write a UTF-16BE string zero-padded to `size` characters
    pub fn wstr_fixed(&mut self, value: &str, size: usize) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        if units.len() > size {
            return Err(StreamError::StringTooLong {
                length: units.len(),
                size,
            });
        }
        self.utf16_units(&units)?;
        self.pad((size - units.len()) * 2)
    }

    /// Write a length-prefixed narrow string
    ///
    /// With compact integers enabled the stored length is twice the
    /// character count. [`ByteReader::str`](crate::ByteReader::str) halves it.
    pub fn str(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.string_length(bytes.len())?;
        self.bytes(bytes)
    }

    /// Write a length-prefixed UTF-16BE string
    ///
    /// Same doubled length prefix as [`ByteWriter::str`] under compact
    /// integers.
    pub fn wstr(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.string_length(units.len())?;
        self.utf16_units(&units)
    }

    fn string_length(&mut self, chars: usize) -> Result<()> {
        let size = if self.flags.compressed_integers() {
            chars * 2
        } else {
            chars
        };
        self.count(size)
    }

    fn utf16_units(&mut self, units: &[u16]) -> Result<()> {
        let out = self.reserve(units.len() * 2)?;
        for (chunk, unit) in out.chunks_exact_mut(2).zip(units) {
            Endian::Big.write_u16(chunk, *unit);
        }
        Ok(())
    }

    // === Identifiers and tags ===

    /// Write a 20-byte SHA1
    pub fn sha1(&mut self, value: &Sha1Hash) -> Result<()> {
        self.bytes(value.as_bytes())
    }

    /// Write a GUID as a 32-bit integer
    pub fn guid(&mut self, value: Guid, force: bool) -> Result<()> {
        self.u32(value.value(), force)
    }

    /// Write a 1-byte enum tag
    pub fn enum8<T: ValueEnum<u8>>(&mut self, value: T) -> Result<()> {
        self.u8(value.value())
    }

    /// Write a 4-byte enum tag (compressible like any 32-bit integer)
    pub fn enum32<T: ValueEnum<u32>>(&mut self, value: T) -> Result<()> {
        self.u32(value.value(), false)
    }

    // === Sequences ===

    /// Write a length-prefixed array of i16
    pub fn i16_array(&mut self, values: &[i16]) -> Result<()> {
        self.count(values.len())?;
        values.iter().try_for_each(|v| self.i16(*v))
    }

    /// Write a length-prefixed array of i32
    pub fn i32_array(&mut self, values: &[i32]) -> Result<()> {
        self.count(values.len())?;
        values.iter().try_for_each(|v| self.i32(*v, false))
    }

    /// Write a length-prefixed array of i64
    pub fn i64_array(&mut self, values: &[i64]) -> Result<()> {
        self.count(values.len())?;
        values.iter().try_for_each(|v| self.i64(*v, false))
    }

    /// Write a length-prefixed array of f32
    pub fn f32_array(&mut self, values: &[f32]) -> Result<()> {
        self.count(values.len())?;
        values.iter().try_for_each(|v| self.f32(*v))
    }

    /// Write a length-prefixed array of 1-byte enum tags
    pub fn enum8_array<T: ValueEnum<u8>>(&mut self, values: &[T]) -> Result<()> {
        self.count(values.len())?;
        values.iter().try_for_each(|v| self.enum8(*v))
    }
}

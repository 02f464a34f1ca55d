//! Byte order selection
//!
//! Streams default to big-endian, matching the console targets the format
//! was designed for. Little-endian is selectable per stream.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of fixed-width primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Most significant byte first
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

macro_rules! dispatch {
    ($(($write:ident, $read:ident, $ty:ty)),* $(,)?) => {
        impl Endian {
            $(
                /// Encode into the first bytes of `buf`
                #[inline]
                pub fn $write(self, buf: &mut [u8], value: $ty) {
                    match self {
                        Endian::Big => BigEndian::$write(buf, value),
                        Endian::Little => LittleEndian::$write(buf, value),
                    }
                }

                /// Decode from the first bytes of `buf`
                #[inline]
                pub fn $read(self, buf: &[u8]) -> $ty {
                    match self {
                        Endian::Big => BigEndian::$read(buf),
                        Endian::Little => LittleEndian::$read(buf),
                    }
                }
            )*
        }
    };
}

dispatch!(
    (write_u16, read_u16, u16),
    (write_u24, read_u24, u32),
    (write_u32, read_u32, u32),
    (write_u64, read_u64, u64),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_u32() {
        let mut buf = [0u8; 4];
        Endian::Big.write_u32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(Endian::Big.read_u32(&buf), 0x0102_0304);
    }

    #[test]
    fn test_little_endian_u24() {
        let mut buf = [0u8; 3];
        Endian::Little.write_u24(&mut buf, 0x0A0B0C);
        assert_eq!(buf, [0x0C, 0x0B, 0x0A]);
        assert_eq!(Endian::Little.read_u24(&buf), 0x0A0B0C);
    }

    #[test]
    fn test_default_is_big() {
        assert_eq!(Endian::default(), Endian::Big);
    }
}

//! Property tests for the compact encodings
//!
//! These verify that writer and reader agree for arbitrary values under
//! both flag settings, and pin the exact bytes of the documented cases.

use craftkit_stream::{ByteReader, ByteWriter, CompressionFlags, Endian, SeekMode, IDENTITY};
use proptest::prelude::*;

fn roundtrip_u32(value: u32, flags: CompressionFlags) -> (u32, usize) {
    let mut w = ByteWriter::with_flags(16, flags);
    w.u32(value, false).unwrap();
    let written = w.offset();
    let mut r = ByteReader::with_flags(w.into_bytes(), flags);
    let back = r.u32(false).unwrap();
    assert_eq!(r.offset(), written);
    (back, written)
}

proptest! {
    #[test]
    fn prop_u32_roundtrip_compact(value in any::<u32>()) {
        let (back, _) = roundtrip_u32(value, CompressionFlags::COMPRESSED_INTEGERS);
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_u32_roundtrip_fixed(value in any::<u32>()) {
        let (back, len) = roundtrip_u32(value, CompressionFlags::NONE);
        prop_assert_eq!(back, value);
        prop_assert_eq!(len, 4);
    }

    #[test]
    fn prop_compact_length_bound(value in any::<u32>()) {
        let (_, len) = roundtrip_u32(value, CompressionFlags::COMPRESSED_INTEGERS);
        prop_assert!(len >= 1 && len <= 5);
    }

    // u64::MAX and i64::MAX decode as the 32-bit sentinel, so they are excluded
    #[test]
    fn prop_u64_roundtrip_compact(value in 0u64..(i64::MAX as u64)) {
        let mut w = ByteWriter::with_flags(16, CompressionFlags::COMPRESSED_INTEGERS);
        w.u64(value, false).unwrap();
        let mut r = ByteReader::with_flags(w.into_bytes(), CompressionFlags::COMPRESSED_INTEGERS);
        prop_assert_eq!(r.u64(false).unwrap(), value);
    }

    #[test]
    fn prop_matrix_roundtrip(
        cells in proptest::collection::vec(-100.0f32..100.0, 16),
        keep in any::<u16>(),
    ) {
        let mut m = IDENTITY;
        for i in 0..16 {
            if (keep >> i) & 1 == 1 {
                m[i] = cells[i];
            }
        }
        for flags in [CompressionFlags::NONE, CompressionFlags::COMPRESSED_MATRICES] {
            let mut w = ByteWriter::with_flags(128, flags);
            w.matrix(&m).unwrap();
            let mut r = ByteReader::with_flags(w.into_bytes(), flags);
            prop_assert_eq!(r.matrix().unwrap(), m);
            prop_assert!(r.is_eof());
        }
    }

    #[test]
    fn prop_strings_roundtrip(s in "[a-zA-Z0-9 _]{0,40}") {
        for flags in [CompressionFlags::NONE, CompressionFlags::COMPRESSED_INTEGERS] {
            let mut w = ByteWriter::with_flags(256, flags);
            w.str(&s).unwrap();
            w.wstr(&s).unwrap();
            let mut r = ByteReader::with_flags(w.into_bytes(), flags);
            prop_assert_eq!(r.str().unwrap(), s.clone());
            prop_assert_eq!(r.wstr().unwrap(), s.clone());
        }
    }
}

#[test]
fn test_documented_compact_integer_bytes() {
    let cases: [(u32, &[u8]); 3] = [
        (0, &[0x00]),
        (300, &[0xAC, 0x02]),
        (0xFFFF_FFFF, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
    ];
    for (value, expected) in cases {
        let mut w = ByteWriter::with_flags(8, CompressionFlags::COMPRESSED_INTEGERS);
        w.u32(value, false).unwrap();
        assert_eq!(w.into_bytes(), expected);
    }

    let mut w = ByteWriter::with_flags(8, CompressionFlags::COMPRESSED_INTEGERS);
    w.i64(i64::MAX, false).unwrap();
    assert_eq!(w.into_bytes(), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
}

#[test]
fn test_seek_rejects_out_of_range_in_every_mode() {
    let mut r = ByteReader::new(vec![0u8; 8]);
    r.seek(4, SeekMode::Begin).unwrap();

    for mode in [SeekMode::Begin, SeekMode::Relative, SeekMode::End] {
        assert!(r.seek(-1, mode).unwrap_err().is_bounds());
        assert_eq!(r.offset(), 4);
    }
    assert!(r.seek(8, SeekMode::Begin).unwrap_err().is_bounds());
    assert!(r.seek(4, SeekMode::Relative).unwrap_err().is_bounds());
    assert!(r.seek(9, SeekMode::End).unwrap_err().is_bounds());
    assert_eq!(r.offset(), 4);
}

#[test]
fn test_little_endian_session() {
    let mut w = ByteWriter::new(16).with_endian(Endian::Little);
    w.u16(0x1234).unwrap();
    w.i32(-2, false).unwrap();
    let bytes = w.into_bytes();
    assert_eq!(bytes, vec![0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF]);

    let mut r = ByteReader::new(bytes).with_endian(Endian::Little);
    assert_eq!(r.u16().unwrap(), 0x1234);
    assert_eq!(r.i32(false).unwrap(), -2);
}

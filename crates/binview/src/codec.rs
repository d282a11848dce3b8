// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar encoding/decoding with a context-wide byte order.

use crate::error::{Error, Result};
use crate::types::PrimitiveKind;
use crate::value::Scalar;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order applied to every multi-byte primitive of a data context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

impl Endianness {
    /// Byte order of the running platform.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }
}

/// Decode `bytes` (exactly `kind.size()` long) into a scalar.
pub(crate) fn decode(kind: PrimitiveKind, bytes: &[u8], endianness: Endianness) -> Scalar {
    match endianness {
        Endianness::Big => decode_with::<BigEndian>(kind, bytes),
        Endianness::Little => decode_with::<LittleEndian>(kind, bytes),
    }
}

fn decode_with<B: ByteOrder>(kind: PrimitiveKind, b: &[u8]) -> Scalar {
    match kind {
        PrimitiveKind::I8 => Scalar::I8(b[0] as i8),
        PrimitiveKind::U8 => Scalar::U8(b[0]),
        PrimitiveKind::I16 => Scalar::I16(B::read_i16(b)),
        PrimitiveKind::U16 => Scalar::U16(B::read_u16(b)),
        PrimitiveKind::I32 => Scalar::I32(B::read_i32(b)),
        PrimitiveKind::U32 => Scalar::U32(B::read_u32(b)),
        PrimitiveKind::I64 => Scalar::I64(B::read_i64(b)),
        PrimitiveKind::U64 => Scalar::U64(B::read_u64(b)),
        PrimitiveKind::F32 => Scalar::F32(B::read_f32(b)),
        PrimitiveKind::F64 => Scalar::F64(B::read_f64(b)),
        PrimitiveKind::Text(_) => Scalar::Text(b.to_vec()),
    }
}

/// Encode `value` as `kind` into `out` (exactly `kind.size()` long).
///
/// Integers are range-checked against the target width; floats are only
/// accepted for float kinds. Text shorter than the field is zero-padded.
pub(crate) fn encode(
    kind: PrimitiveKind,
    value: &Scalar,
    endianness: Endianness,
    out: &mut [u8],
) -> Result<()> {
    match endianness {
        Endianness::Big => encode_with::<BigEndian>(kind, value, out),
        Endianness::Little => encode_with::<LittleEndian>(kind, value, out),
    }
}

fn encode_with<B: ByteOrder>(kind: PrimitiveKind, value: &Scalar, out: &mut [u8]) -> Result<()> {
    let mismatch = || Error::mismatch(kind.name(), value.kind().name());
    match kind {
        PrimitiveKind::I8 => out[0] = int_value::<i8>(value).ok_or_else(mismatch)? as u8,
        PrimitiveKind::U8 => out[0] = int_value::<u8>(value).ok_or_else(mismatch)?,
        PrimitiveKind::I16 => B::write_i16(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::U16 => B::write_u16(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::I32 => B::write_i32(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::U32 => B::write_u32(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::I64 => B::write_i64(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::U64 => B::write_u64(out, int_value(value).ok_or_else(mismatch)?),
        PrimitiveKind::F32 => match value {
            Scalar::F32(v) => B::write_f32(out, *v),
            _ => return Err(mismatch()),
        },
        PrimitiveKind::F64 => match value {
            Scalar::F64(v) => B::write_f64(out, *v),
            Scalar::F32(v) => B::write_f64(out, f64::from(*v)),
            _ => return Err(mismatch()),
        },
        PrimitiveKind::Text(len) => {
            let Scalar::Text(bytes) = value else {
                return Err(mismatch());
            };
            if bytes.len() > len {
                return Err(Error::mismatch(
                    format!("text of at most {} bytes", len),
                    format!("text of {} bytes", bytes.len()),
                ));
            }
            out[..bytes.len()].copy_from_slice(bytes);
            out[bytes.len()..].fill(0);
        }
    }
    Ok(())
}

/// Integer scalar converted to `T` when it fits.
fn int_value<T>(value: &Scalar) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match value {
        Scalar::U64(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
        other => <T as TryFrom<i64>>::try_from(other.as_i64()?).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(kind: PrimitiveKind, value: Scalar, endianness: Endianness) -> Scalar {
        let mut buf = vec![0u8; kind.size()];
        encode(kind, &value, endianness, &mut buf).expect("encode");
        decode(kind, &buf, endianness)
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = [0u8; 4];
        encode(PrimitiveKind::I32, &Scalar::I32(3), Endianness::Big, &mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 3]);
        encode(PrimitiveKind::I32, &Scalar::I32(3), Endianness::Little, &mut buf).unwrap();
        assert_eq!(buf, [3, 0, 0, 0]);
    }

    #[test]
    fn test_decode_double() {
        let bytes = 222.2f64.to_be_bytes();
        assert_eq!(
            decode(PrimitiveKind::F64, &bytes, Endianness::Big),
            Scalar::F64(222.2)
        );
        let bytes = 222.2f64.to_le_bytes();
        assert_eq!(
            decode(PrimitiveKind::F64, &bytes, Endianness::Little),
            Scalar::F64(222.2)
        );
    }

    #[test]
    fn test_integer_widening_and_range() {
        assert_eq!(
            roundtrip(PrimitiveKind::I64, Scalar::U8(200), Endianness::Big),
            Scalar::I64(200)
        );
        let mut buf = [0u8; 1];
        let err = encode(PrimitiveKind::U8, &Scalar::I32(300), Endianness::Big, &mut buf);
        assert!(matches!(err, Err(Error::TypeMismatch { .. })));
        let err = encode(PrimitiveKind::U16, &Scalar::I16(-1), Endianness::Big, &mut [0u8; 2]);
        assert!(err.is_err());
        assert_eq!(
            roundtrip(PrimitiveKind::U64, Scalar::U64(u64::MAX), Endianness::Little),
            Scalar::U64(u64::MAX)
        );
    }

    #[test]
    fn test_float_rules() {
        let mut buf = [0u8; 4];
        assert!(encode(PrimitiveKind::F32, &Scalar::F64(1.0), Endianness::Big, &mut buf).is_err());
        assert!(encode(PrimitiveKind::I32, &Scalar::F32(1.0), Endianness::Big, &mut buf).is_err());
        assert_eq!(
            roundtrip(PrimitiveKind::F64, Scalar::F32(0.5), Endianness::Big),
            Scalar::F64(0.5)
        );
    }

    #[test]
    fn test_text_padding() {
        let value = roundtrip(
            PrimitiveKind::Text(6),
            Scalar::Text(b"abc".to_vec()),
            Endianness::Big,
        );
        assert_eq!(value, Scalar::Text(b"abc\0\0\0".to_vec()));

        let mut buf = [0u8; 2];
        let err = encode(
            PrimitiveKind::Text(2),
            &Scalar::Text(b"abc".to_vec()),
            Endianness::Big,
            &mut buf,
        );
        assert!(err.is_err());
    }
}

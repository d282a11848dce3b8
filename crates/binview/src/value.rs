// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar values read from or written to primitive fields.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::types::PrimitiveKind;
use std::borrow::Cow;
use std::fmt;

/// Value of a primitive field.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Raw code units of a fixed-length text field, padding included.
    Text(Vec<u8>),
}

impl Scalar {
    /// Primitive kind this value encodes to without conversion.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::I8(_) => PrimitiveKind::I8,
            Self::U8(_) => PrimitiveKind::U8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::U16(_) => PrimitiveKind::U16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::U32(_) => PrimitiveKind::U32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Text(bytes) => PrimitiveKind::Text(bytes.len()),
        }
    }

    /// Integer value widened to i64 (`None` for floats, text, or u64 > i64::MAX).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::U8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::U16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::U32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integer value as u64 (`None` for negatives, floats and text).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            other => u64::try_from(other.as_i64()?).ok(),
        }
    }

    /// Any numeric value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            Self::U64(v) => Some(*v as f64),
            Self::Text(_) => None,
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Text content, lossily decoded, padding included.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    /// Text content up to the first NUL, trailing blanks removed.
    pub fn trimmed_text(&self) -> Option<String> {
        let Self::Text(bytes) = self else {
            return None;
        };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).trim_end().to_string())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Text(_) => write!(f, "{:?}", self.trimmed_text().unwrap_or_default()),
        }
    }
}

macro_rules! impl_from_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_native!(
    i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32,
    i64 => I64, u64 => U64, f32 => F32, f64 => F64,
);

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.as_bytes().to_vec())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v.into_bytes())
    }
}

impl From<&[u8]> for Scalar {
    fn from(v: &[u8]) -> Self {
        Self::Text(v.to_vec())
    }
}

/// Conversion from a [`Scalar`] into a native type.
///
/// Integers convert across widths when the value fits; floats accept
/// `F32` widening into `f64` but never integer sources.
pub trait FromScalar: Sized {
    fn from_scalar(value: Scalar) -> Result<Self>;
}

macro_rules! impl_from_scalar_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(value: Scalar) -> Result<Self> {
                    let converted = match &value {
                        Scalar::U64(v) => <$ty>::try_from(*v).ok(),
                        other => other.as_i64().and_then(|v| <$ty>::try_from(v).ok()),
                    };
                    converted.ok_or_else(|| Error::mismatch(stringify!($ty), value.kind().name()))
                }
            }
        )*
    };
}

impl_from_scalar_int!(i8, u8, i16, u16, i32, u32, i64, u64, usize);

impl FromScalar for f32 {
    fn from_scalar(value: Scalar) -> Result<Self> {
        match value {
            Scalar::F32(v) => Ok(v),
            other => Err(Error::mismatch("f32", other.kind().name())),
        }
    }
}

impl FromScalar for f64 {
    fn from_scalar(value: Scalar) -> Result<Self> {
        match value {
            Scalar::F64(v) => Ok(v),
            Scalar::F32(v) => Ok(f64::from(v)),
            other => Err(Error::mismatch("f64", other.kind().name())),
        }
    }
}

impl FromScalar for String {
    fn from_scalar(value: Scalar) -> Result<Self> {
        value
            .trimmed_text()
            .ok_or_else(|| Error::mismatch("text", value.kind().name()))
    }
}

impl FromScalar for Scalar {
    fn from_scalar(value: Scalar) -> Result<Self> {
        Ok(value)
    }
}

/// Rational number stored as two integer fields.
///
/// [`value`](Self::value) uses floating-point division; integer division is
/// only available explicitly through [`truncated`](Self::truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Read numerator and denominator from two integer members of a composite.
    pub fn from_instance(instance: &Instance, numerator: &str, denominator: &str) -> Result<Self> {
        Ok(Self::new(
            instance.get::<i64>(numerator)?,
            instance.get::<i64>(denominator)?,
        ))
    }

    /// Real-valued magnitude, `None` when the denominator is zero.
    pub fn value(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }

    /// Integer quotient truncated toward zero, `None` when the denominator is zero.
    pub fn truncated(&self) -> Option<i64> {
        self.numerator.checked_div(self.denominator)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(Scalar::U16(65535).as_i64(), Some(65535));
        assert_eq!(Scalar::I8(-3).as_u64(), None);
        assert_eq!(Scalar::U64(u64::MAX).as_i64(), None);
        assert_eq!(Scalar::U64(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Scalar::F64(1.5).as_i64(), None);
        assert_eq!(Scalar::I32(7).as_f64(), Some(7.0));
    }

    #[test]
    fn test_from_scalar() {
        assert_eq!(i64::from_scalar(Scalar::I32(-4)).unwrap(), -4);
        assert_eq!(u8::from_scalar(Scalar::U32(200)).unwrap(), 200);
        assert!(u8::from_scalar(Scalar::U32(256)).is_err());
        assert!(i32::from_scalar(Scalar::F64(1.0)).is_err());
        assert_eq!(f64::from_scalar(Scalar::F32(0.25)).unwrap(), 0.25);
        assert!(f32::from_scalar(Scalar::F64(0.25)).is_err());
        assert_eq!(
            String::from_scalar(Scalar::Text(b"SM_OPER \0\0".to_vec())).unwrap(),
            "SM_OPER"
        );
    }

    #[test]
    fn test_text_accessors() {
        let text = Scalar::from("ab\0cd");
        assert_eq!(text.kind(), PrimitiveKind::Text(5));
        assert_eq!(text.trimmed_text().as_deref(), Some("ab"));
        assert_eq!(text.as_text().map(|t| t.len()), Some(5));
        assert_eq!(Scalar::I8(1).trimmed_text(), None);
    }

    #[test]
    fn test_rational_division() {
        let r = Rational::new(7, 2);
        assert_eq!(r.value(), Some(3.5));
        assert_eq!(r.truncated(), Some(3));
        assert_eq!(Rational::new(-7, 2).truncated(), Some(-3));
        assert_eq!(Rational::new(1, 0).value(), None);
        assert_eq!(Rational::new(1, 0).truncated(), None);
        assert_eq!(r.to_string(), "7/2");
    }
}

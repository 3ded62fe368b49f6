//! ZCL wire types and decoded scalar values

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the bytes of a type are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Boolean,
    Unsigned,
    Signed,
    Float32,
    Float64,
    Bytes,
}

/// ZCL data type code
///
/// Every known code has a fixed width and an [`Interpretation`]. Codes this
/// table does not cover are kept as [`TypeCode::Unknown`] so callers can
/// decide what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum TypeCode {
    Data8,
    Data16,
    Data24,
    Data32,
    Data48,
    Data64,
    Boolean,
    Bitmap8,
    Bitmap16,
    Bitmap24,
    Bitmap32,
    Bitmap48,
    Bitmap64,
    Uint8,
    Uint16,
    Uint24,
    Uint32,
    Uint48,
    Uint64,
    Int8,
    Int16,
    Int24,
    Int32,
    Int48,
    Int64,
    Enum8,
    Enum16,
    Float32,
    Float64,
    Ieee,
    Unknown(u8),
}

impl From<u8> for TypeCode {
    fn from(value: u8) -> Self {
        match value {
            0x08 => TypeCode::Data8,
            0x09 => TypeCode::Data16,
            0x0A => TypeCode::Data24,
            0x0B => TypeCode::Data32,
            0x0D => TypeCode::Data48,
            0x0F => TypeCode::Data64,
            0x10 => TypeCode::Boolean,
            0x18 => TypeCode::Bitmap8,
            0x19 => TypeCode::Bitmap16,
            0x1A => TypeCode::Bitmap24,
            0x1B => TypeCode::Bitmap32,
            0x1D => TypeCode::Bitmap48,
            0x1F => TypeCode::Bitmap64,
            0x20 => TypeCode::Uint8,
            0x21 => TypeCode::Uint16,
            0x22 => TypeCode::Uint24,
            0x23 => TypeCode::Uint32,
            0x25 => TypeCode::Uint48,
            0x27 => TypeCode::Uint64,
            0x28 => TypeCode::Int8,
            0x29 => TypeCode::Int16,
            0x2A => TypeCode::Int24,
            0x2B => TypeCode::Int32,
            0x2D => TypeCode::Int48,
            0x2F => TypeCode::Int64,
            0x30 => TypeCode::Enum8,
            0x31 => TypeCode::Enum16,
            0x39 => TypeCode::Float32,
            0x3A => TypeCode::Float64,
            0xF0 => TypeCode::Ieee,
            v => TypeCode::Unknown(v),
        }
    }
}

impl From<TypeCode> for u8 {
    fn from(value: TypeCode) -> Self {
        value.code()
    }
}

impl TypeCode {
    /// The code as it appears on the wire
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            TypeCode::Data8 => 0x08,
            TypeCode::Data16 => 0x09,
            TypeCode::Data24 => 0x0A,
            TypeCode::Data32 => 0x0B,
            TypeCode::Data48 => 0x0D,
            TypeCode::Data64 => 0x0F,
            TypeCode::Boolean => 0x10,
            TypeCode::Bitmap8 => 0x18,
            TypeCode::Bitmap16 => 0x19,
            TypeCode::Bitmap24 => 0x1A,
            TypeCode::Bitmap32 => 0x1B,
            TypeCode::Bitmap48 => 0x1D,
            TypeCode::Bitmap64 => 0x1F,
            TypeCode::Uint8 => 0x20,
            TypeCode::Uint16 => 0x21,
            TypeCode::Uint24 => 0x22,
            TypeCode::Uint32 => 0x23,
            TypeCode::Uint48 => 0x25,
            TypeCode::Uint64 => 0x27,
            TypeCode::Int8 => 0x28,
            TypeCode::Int16 => 0x29,
            TypeCode::Int24 => 0x2A,
            TypeCode::Int32 => 0x2B,
            TypeCode::Int48 => 0x2D,
            TypeCode::Int64 => 0x2F,
            TypeCode::Enum8 => 0x30,
            TypeCode::Enum16 => 0x31,
            TypeCode::Float32 => 0x39,
            TypeCode::Float64 => 0x3A,
            TypeCode::Ieee => 0xF0,
            TypeCode::Unknown(v) => v,
        }
    }

    /// Fixed width in bytes, `None` for unknown codes
    #[must_use]
    pub fn width(self) -> Option<usize> {
        match self {
            TypeCode::Data8
            | TypeCode::Boolean
            | TypeCode::Bitmap8
            | TypeCode::Uint8
            | TypeCode::Int8
            | TypeCode::Enum8 => Some(1),
            TypeCode::Data16
            | TypeCode::Bitmap16
            | TypeCode::Uint16
            | TypeCode::Int16
            | TypeCode::Enum16 => Some(2),
            TypeCode::Data24 | TypeCode::Bitmap24 | TypeCode::Uint24 | TypeCode::Int24 => Some(3),
            TypeCode::Data32
            | TypeCode::Bitmap32
            | TypeCode::Uint32
            | TypeCode::Int32
            | TypeCode::Float32 => Some(4),
            TypeCode::Data48 | TypeCode::Bitmap48 | TypeCode::Uint48 | TypeCode::Int48 => Some(6),
            TypeCode::Data64
            | TypeCode::Bitmap64
            | TypeCode::Uint64
            | TypeCode::Int64
            | TypeCode::Float64
            | TypeCode::Ieee => Some(8),
            TypeCode::Unknown(_) => None,
        }
    }

    /// Interpretation rule, `None` for unknown codes
    #[must_use]
    pub fn interpretation(self) -> Option<Interpretation> {
        match self {
            TypeCode::Boolean => Some(Interpretation::Boolean),
            TypeCode::Bitmap8
            | TypeCode::Bitmap16
            | TypeCode::Bitmap24
            | TypeCode::Bitmap32
            | TypeCode::Bitmap48
            | TypeCode::Bitmap64
            | TypeCode::Uint8
            | TypeCode::Uint16
            | TypeCode::Uint24
            | TypeCode::Uint32
            | TypeCode::Uint48
            | TypeCode::Uint64
            | TypeCode::Enum8
            | TypeCode::Enum16 => Some(Interpretation::Unsigned),
            TypeCode::Int8
            | TypeCode::Int16
            | TypeCode::Int24
            | TypeCode::Int32
            | TypeCode::Int48
            | TypeCode::Int64 => Some(Interpretation::Signed),
            TypeCode::Float32 => Some(Interpretation::Float32),
            TypeCode::Float64 => Some(Interpretation::Float64),
            TypeCode::Data8
            | TypeCode::Data16
            | TypeCode::Data24
            | TypeCode::Data32
            | TypeCode::Data48
            | TypeCode::Data64
            | TypeCode::Ieee => Some(Interpretation::Bytes),
            TypeCode::Unknown(_) => None,
        }
    }

    /// Whether the code is in the width table
    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, TypeCode::Unknown(_))
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCode::Unknown(v) => write!(f, "unknown({v:#04x})"),
            known => write!(f, "{known:?}({:#04x})", known.code()),
        }
    }
}

/// A decoded attribute value
///
/// Narrow integers are widened on decode: unsigned values are zero-extended
/// into `UInt`, signed values are sign-extended into `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    Bool(bool),
    #[serde(rename = "uint")]
    UInt(u64),
    Int(i64),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// Numeric view of the value; booleans map to 0/1, raw bytes have none
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ScalarValue::UInt(v) => Some(*v as f64),
            ScalarValue::Int(v) => Some(*v as f64),
            ScalarValue::F32(v) => Some(f64::from(*v)),
            ScalarValue::F64(v) => Some(*v),
            ScalarValue::Bytes(_) => None,
        }
    }

    /// Integer view of the value, used for label lookups
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Bool(b) => Some(i64::from(*b)),
            ScalarValue::UInt(v) => i64::try_from(*v).ok(),
            ScalarValue::Int(v) => Some(*v),
            ScalarValue::F32(_) | ScalarValue::F64(_) | ScalarValue::Bytes(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::UInt(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::F32(v) => write!(f, "{v}"),
            ScalarValue::F64(v) => write!(f, "{v}"),
            ScalarValue::Bytes(v) => write!(f, "0x{}", hex::encode_upper(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_roundtrip() {
        for code in 0..=u8::MAX {
            assert_eq!(TypeCode::from(code).code(), code);
        }
    }

    #[test]
    fn test_known_codes_have_width_and_rule() {
        for code in 0..=u8::MAX {
            let t = TypeCode::from(code);
            assert_eq!(t.width().is_some(), t.is_known());
            assert_eq!(t.interpretation().is_some(), t.is_known());
        }
    }

    #[test]
    fn test_widths() {
        assert_eq!(TypeCode::from(0x10).width(), Some(1));
        assert_eq!(TypeCode::from(0x21).width(), Some(2));
        assert_eq!(TypeCode::from(0x22).width(), Some(3));
        assert_eq!(TypeCode::from(0x39).width(), Some(4));
        assert_eq!(TypeCode::from(0x25).width(), Some(6));
        assert_eq!(TypeCode::from(0x3A).width(), Some(8));
        assert_eq!(TypeCode::from(0x24).width(), None);
    }

    #[test]
    fn test_serde_as_code() {
        let json = serde_json::to_string(&TypeCode::Uint16).unwrap();
        assert_eq!(json, "33");
        let t: TypeCode = serde_json::from_str("41").unwrap();
        assert_eq!(t, TypeCode::Int16);
    }

    #[test]
    fn test_scalar_views() {
        assert_eq!(ScalarValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(ScalarValue::Int(-20).as_i64(), Some(-20));
        assert_eq!(ScalarValue::UInt(u64::MAX).as_i64(), None);
        assert_eq!(ScalarValue::Bytes(vec![1]).as_f64(), None);
    }
}

//! ZCL primitive decoder and encoder
//!
//! All multi-byte values are little-endian on the wire. A value occupies
//! exactly the fixed width of its [`TypeCode`]; trailing input bytes are
//! ignored on decode.

use crate::error::CodecError;
use crate::types::{Interpretation, ScalarValue, TypeCode};
use bytes::{BufMut, BytesMut};

/// Decode one value of `type_code` from the start of `bytes`
pub fn decode(type_code: TypeCode, bytes: &[u8]) -> Result<ScalarValue, CodecError> {
    let (width, rule) = layout(type_code)?;
    if bytes.len() < width {
        return Err(CodecError::Truncated {
            needed: width,
            available: bytes.len(),
        });
    }
    let raw = &bytes[..width];

    let value = match rule {
        Interpretation::Boolean => ScalarValue::Bool(raw[0] != 0),
        Interpretation::Unsigned => ScalarValue::UInt(read_le(raw)),
        Interpretation::Signed => ScalarValue::Int(sign_extend(read_le(raw), width)),
        #[allow(clippy::cast_possible_truncation)]
        Interpretation::Float32 => ScalarValue::F32(f32::from_bits(read_le(raw) as u32)),
        Interpretation::Float64 => ScalarValue::F64(f64::from_bits(read_le(raw))),
        Interpretation::Bytes => ScalarValue::Bytes(raw.to_vec()),
    };
    Ok(value)
}

/// Encode `value` as the fixed-width little-endian form of `type_code`
///
/// Integers are range checked against the width; nothing is clamped. The
/// value variant must match the type's interpretation, so `UInt` is only
/// accepted for unsigned types and `Int` only for signed ones.
pub fn encode(type_code: TypeCode, value: &ScalarValue) -> Result<Vec<u8>, CodecError> {
    let (width, rule) = layout(type_code)?;
    let mut buf = BytesMut::with_capacity(width);

    match (rule, value) {
        (Interpretation::Boolean, ScalarValue::Bool(b)) => buf.put_u8(u8::from(*b)),
        (Interpretation::Unsigned, ScalarValue::UInt(v)) => {
            if *v > mask(width) {
                return Err(out_of_range(type_code, value));
            }
            buf.put_uint_le(*v, width);
        }
        (Interpretation::Signed, ScalarValue::Int(v)) => {
            if !signed_fits(*v, width) {
                return Err(out_of_range(type_code, value));
            }
            // Two's complement, truncated to the low `width` bytes
            #[allow(clippy::cast_sign_loss)]
            buf.put_uint_le(*v as u64 & mask(width), width);
        }
        (Interpretation::Float32, ScalarValue::F32(v)) => buf.put_f32_le(*v),
        (Interpretation::Float64, ScalarValue::F64(v)) => buf.put_f64_le(*v),
        (Interpretation::Bytes, ScalarValue::Bytes(b)) => {
            if b.len() != width {
                return Err(out_of_range(type_code, value));
            }
            buf.put_slice(b);
        }
        _ => {
            return Err(CodecError::ValueMismatch {
                code: type_code.code(),
                value: value.to_string(),
            })
        }
    }

    Ok(buf.to_vec())
}

/// Turn a hex payload (wire byte order) into bytes
pub fn bytes_from_hex(hex_str: &str) -> Result<Vec<u8>, CodecError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&cleaned).map_err(|e| CodecError::InvalidHex(format!("{hex_str:?}: {e}")))
}

/// Decode a value given as a hex payload, e.g. `"E803"` as uint16 is 1000
pub fn decode_hex(type_code: TypeCode, hex_str: &str) -> Result<ScalarValue, CodecError> {
    decode(type_code, &bytes_from_hex(hex_str)?)
}

/// Uppercase hex rendering of an encoded payload
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

fn layout(type_code: TypeCode) -> Result<(usize, Interpretation), CodecError> {
    match (type_code.width(), type_code.interpretation()) {
        (Some(width), Some(rule)) => Ok((width, rule)),
        _ => Err(CodecError::UnknownType(type_code.code())),
    }
}

fn read_le(raw: &[u8]) -> u64 {
    raw.iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (8 * i)))
}

fn mask(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * width)) - 1
    }
}

/// Two's-complement recovery shared by every signed width
#[allow(clippy::cast_possible_wrap)]
fn sign_extend(raw: u64, width: usize) -> i64 {
    if width >= 8 {
        return raw as i64;
    }
    let bits = 8 * width;
    let signed_max = (1u64 << (bits - 1)) - 1;
    if raw > signed_max {
        raw as i64 - (1i64 << bits)
    } else {
        raw as i64
    }
}

fn signed_fits(v: i64, width: usize) -> bool {
    if width >= 8 {
        return true;
    }
    let bits = 8 * width;
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    (min..=max).contains(&v)
}

fn out_of_range(type_code: TypeCode, value: &ScalarValue) -> CodecError {
    CodecError::OutOfRange {
        code: type_code.code(),
        value: value.to_string(),
    }
}

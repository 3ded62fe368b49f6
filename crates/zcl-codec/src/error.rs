//! Codec error types

use thiserror::Error;

/// Errors produced while decoding or encoding attribute values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The type code has no known width or interpretation
    #[error("Unknown type code: {0:#04X}")]
    UnknownType(u8),

    /// Fewer bytes remain than the type requires
    #[error("Truncated value: need {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// The value does not fit the width of the target type
    #[error("Value {value} out of range for type {code:#04X}")]
    OutOfRange { code: u8, value: String },

    /// The value variant does not match the type's interpretation
    #[error("Value {value} cannot be encoded as type {code:#04X}")]
    ValueMismatch { code: u8, value: String },

    /// A hex payload could not be turned into bytes
    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),
}

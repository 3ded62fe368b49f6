//! Zigbee attribute value codec
//!
//! This crate decodes and encodes the two binary formats Zigbee devices use
//! to carry attribute values:
//!
//! - ZCL primitives: a type code plus a fixed-width little-endian value.
//! - Vendor tag-type-value streams, where several readings are packed into a
//!   single attribute as repeating `tag(1) type(1) value(width)` records.
//!
//! Everything here is synchronous and side-effect free. Errors are returned
//! as [`CodecError`] and never logged.

pub mod error;
pub mod primitive;
pub mod tlv;
pub mod types;

pub use error::CodecError;
pub use primitive::{bytes_from_hex, decode, decode_hex, encode, to_hex};
pub use tlv::{build, parse, TlvParse, TlvParser, TlvRecord, TlvStop, UnknownTypePolicy};
pub use types::{Interpretation, ScalarValue, TypeCode};

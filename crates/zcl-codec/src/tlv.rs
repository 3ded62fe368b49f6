//! Vendor tag-type-value stream parser and builder
//!
//! Stream format:
//! ```text
//! [Tag: 1 byte]
//! [Type: 1 byte] (ZCL type code, implies the value width)
//! [Value: width bytes LE]
//! ... repeated until the buffer is exhausted
//! ```
//! There is no length prefix and no terminator.

use crate::error::CodecError;
use crate::primitive::{decode, encode};
use crate::types::{ScalarValue, TypeCode};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// Bytes taken by the tag and type header of every record
pub const RECORD_HEADER_SIZE: usize = 2;

/// One decoded record of a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlvRecord {
    pub tag: u8,
    pub type_code: TypeCode,
    pub value: ScalarValue,
}

/// What the parser does when a record carries a type code it cannot size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Stop and keep the records parsed so far
    #[default]
    Abort,
    /// Assume the value is this many bytes wide, drop it, and continue
    SkipWidth(usize),
}

/// Why a parse ended before the buffer was exhausted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvStop {
    /// Offset of the record header that could not be completed
    pub offset: usize,
    pub error: CodecError,
}

/// Full outcome of a parse
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TlvParse {
    pub records: Vec<TlvRecord>,
    /// Records dropped under [`UnknownTypePolicy::SkipWidth`]
    pub skipped: Vec<(usize, u8)>,
    pub stop: Option<TlvStop>,
}

impl TlvParse {
    /// True when every byte of the buffer was consumed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stop.is_none()
    }
}

/// Stream parser configured with an unknown-type policy
#[derive(Debug, Clone, Copy, Default)]
pub struct TlvParser {
    policy: UnknownTypePolicy,
}

impl TlvParser {
    /// Create a parser with the given policy
    #[must_use]
    pub fn new(policy: UnknownTypePolicy) -> Self {
        Self { policy }
    }

    /// Parse the buffer, returning the records only
    #[must_use]
    pub fn parse(&self, buffer: &[u8]) -> Vec<TlvRecord> {
        self.parse_detailed(buffer).records
    }

    /// Parse the buffer, also reporting skipped records and why parsing stopped
    ///
    /// Never panics and never reads past the end of `buffer`; malformed input
    /// yields the records decoded before the fault.
    #[must_use]
    pub fn parse_detailed(&self, buffer: &[u8]) -> TlvParse {
        let mut out = TlvParse::default();
        let mut cursor = 0;

        while cursor < buffer.len() {
            let remaining = buffer.len() - cursor;
            if remaining < RECORD_HEADER_SIZE {
                out.stop = Some(TlvStop {
                    offset: cursor,
                    error: CodecError::Truncated {
                        needed: RECORD_HEADER_SIZE,
                        available: remaining,
                    },
                });
                break;
            }

            let header = cursor;
            let tag = buffer[cursor];
            let type_code = TypeCode::from(buffer[cursor + 1]);
            cursor += RECORD_HEADER_SIZE;
            let available = buffer.len() - cursor;

            let Some(width) = type_code.width() else {
                match self.policy {
                    UnknownTypePolicy::Abort => {
                        out.stop = Some(TlvStop {
                            offset: header,
                            error: CodecError::UnknownType(type_code.code()),
                        });
                        break;
                    }
                    UnknownTypePolicy::SkipWidth(width) if width <= available => {
                        out.skipped.push((header, type_code.code()));
                        cursor += width;
                        continue;
                    }
                    UnknownTypePolicy::SkipWidth(width) => {
                        out.stop = Some(TlvStop {
                            offset: header,
                            error: CodecError::Truncated {
                                needed: width,
                                available,
                            },
                        });
                        break;
                    }
                }
            };

            match decode(type_code, &buffer[cursor..]) {
                Ok(value) => {
                    out.records.push(TlvRecord {
                        tag,
                        type_code,
                        value,
                    });
                    cursor += width;
                }
                Err(error) => {
                    out.stop = Some(TlvStop {
                        offset: header,
                        error,
                    });
                    break;
                }
            }
        }

        out
    }
}

/// Parse a stream with the default abort-on-unknown policy
#[must_use]
pub fn parse(buffer: &[u8]) -> Vec<TlvRecord> {
    TlvParser::default().parse(buffer)
}

/// Pack records into a stream, in order
///
/// Fails on the first record whose value cannot be encoded for its type.
pub fn build(records: &[(u8, TypeCode, ScalarValue)]) -> Result<Vec<u8>, CodecError> {
    let mut buf = BytesMut::new();
    for (tag, type_code, value) in records {
        let encoded = encode(*type_code, value)?;
        buf.reserve(RECORD_HEADER_SIZE + encoded.len());
        buf.put_u8(*tag);
        buf.put_u8(type_code.code());
        buf.put_slice(&encoded);
    }
    Ok(buf.to_vec())
}

impl From<TlvRecord> for (u8, TypeCode, ScalarValue) {
    fn from(record: TlvRecord) -> Self {
        (record.tag, record.type_code, record.value)
    }
}

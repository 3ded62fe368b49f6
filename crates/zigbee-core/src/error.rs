//! Error types for registries and device sessions

use thiserror::Error;
use zcl_codec::CodecError;

/// Errors from the write path and profile handling
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No entry produces an event with this name
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// The entry has no wire type, so it cannot be written
    #[error("Event is not writable: {0}")]
    NotWritable(String),

    /// The value cannot be mapped onto the entry
    #[error("Invalid value {value} for event {event}")]
    InvalidValue { event: String, value: String },

    /// Two entries share an attribute key
    #[error("Duplicate registry key: {0}")]
    DuplicateKey(String),

    /// A cluster or attribute identifier is not valid hex
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Encoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// IO error (profile files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

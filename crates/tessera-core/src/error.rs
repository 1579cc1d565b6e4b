//! Error types for the Tessera core.

use thiserror::Error;

use crate::frame::FrameKind;

/// A persisted or transmitted record failed field validation.
///
/// Decoding is atomic: when any of these is returned, no partial frame is
/// produced.
#[derive(Debug, Error)]
pub enum RepresentationError {
    #[error("representation is not an object")]
    NotAnObject,

    #[error("expected to find value for '{field}'")]
    MissingField { field: &'static str },

    #[error(
        "invalid value '{0}' for 'type', expected one of 'payload', 'trust-exchange', \
         'trust-acceptance', 'public-key-acceptance', 'hash'"
    )]
    UnknownType(String),

    #[error("invalid number for '{field}'")]
    InvalidNumber { field: &'static str },

    #[error("invalid string for '{field}'")]
    InvalidString { field: &'static str },

    #[error("invalid byte encoding for '{field}': {source}")]
    InvalidBytes {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("field '{field}' is not defined for '{kind}' frames")]
    FieldNotAllowed {
        field: &'static str,
        kind: FrameKind,
    },

    #[error("malformed representation: {0}")]
    Json(#[from] serde_json::Error),
}

/// An input to hashing or signing is neither text nor a byte sequence.
#[derive(Debug, Error)]
pub enum SerializableError {
    #[error("invalid value provided as serializable, must be a string or byte sequence (found {found})")]
    Unsupported { found: &'static str },
}

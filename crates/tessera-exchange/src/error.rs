//! Error types for the exchange module.

use tessera_core::{Address, FrameKind, RepresentationError};
use thiserror::Error;

/// Errors that can occur while exchanging frames.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The frame or its reply was lost in transit. The in-process exchange
    /// reports a responder task that panicked or was cancelled; network
    /// transports report connection and delivery failures here.
    #[error("transport error: {0}")]
    TransportError(String),

    /// No responder is registered for the recipient.
    #[error("peer not found: {0}")]
    PeerNotFound(Address),

    /// The frame names no recipient to route it to.
    #[error("no route for {kind} frame")]
    NoRoute { kind: FrameKind },

    /// The counterparty refused the frame.
    #[error("rejected by peer: {0}")]
    Rejected(String),

    /// The counterparty failed while producing its answer.
    #[error("responder failed: {0}")]
    Responder(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A frame did not survive the wire encoding.
    #[error("invalid frame on the wire: {0}")]
    Representation(#[from] RepresentationError),

    /// No transport is configured.
    #[error("no exchange configured")]
    Unavailable,
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

//! Error types for ledgers and parties.

use tessera_core::{Address, FrameKind, RepresentationError, SerializableError};
use tessera_crypto::CryptoError;
use tessera_exchange::ExchangeError;
use tessera_store::StoreError;
use thiserror::Error;

use crate::ledger::LedgerMode;

/// Errors that can occur during ledger and party operations.
///
/// Backend failures pass through unchanged in their own variants.
#[derive(Debug, Error)]
pub enum Error {
    /// A read-write operation on a read-only ledger.
    #[error("invalid mode: operation requires a {expected} ledger, this ledger is {actual}")]
    InvalidMode {
        expected: LedgerMode,
        actual: LedgerMode,
    },

    /// The party was built without a ledger mode.
    #[error("invalid mode: party has no ledger mode configured")]
    ModeNotConfigured,

    /// Storage provider error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Crypto provider error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Exchange error.
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// A record failed field validation.
    #[error("invalid representation: {0}")]
    Representation(#[from] RepresentationError),

    /// A hash or sign input is neither text nor bytes.
    #[error("invalid serializable: {0}")]
    Serializable(#[from] SerializableError),

    /// A frame's hash does not match its content.
    #[error("hash mismatch: frame carries {claimed}, content hashes to {computed}")]
    HashMismatch { claimed: String, computed: String },

    /// A handshake step received the wrong kind of frame.
    #[error("unexpected frame: expected {expected}, got {actual}")]
    UnexpectedFrame {
        expected: FrameKind,
        actual: FrameKind,
    },

    /// A trust offer targets a different party.
    #[error("trust offer addressed to {target}, not to {party}")]
    NotAddressed { target: Address, party: Address },

    /// A trust acceptance does not answer the offer it came back for.
    #[error("acceptance does not answer the offer: {0}")]
    AcceptanceMismatch(String),
}

impl Error {
    /// Whether this is an invalid-mode failure, raised before any backend call.
    pub fn is_invalid_mode(&self) -> bool {
        matches!(self, Error::InvalidMode { .. } | Error::ModeNotConfigured)
    }

    /// Whether a record failed field validation, wherever it was decoded.
    pub fn is_invalid_representation(&self) -> bool {
        matches!(
            self,
            Error::Representation(_)
                | Error::Store(StoreError::Representation { .. })
                | Error::Exchange(ExchangeError::Representation(_))
        )
    }
}

/// Result type for ledger and party operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the crypto module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during crypto operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// I/O error while reading or writing key material.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key file exists but does not hold a usable key.
    #[error("invalid key file {}: expected {expected} bytes, found {found}", path.display())]
    InvalidKeyFile {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Public key bytes are not a valid Ed25519 point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Signature bytes have the wrong length.
    #[error("invalid signature length: {0}")]
    InvalidSignatureLength(usize),

    /// Signature does not verify against the message and key.
    #[error("signature verification failed")]
    SignatureMismatch,
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

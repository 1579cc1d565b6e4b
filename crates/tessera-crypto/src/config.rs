//! Crypto provider configuration.

use std::path::PathBuf;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Content hash function used by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    /// Digest `data`. Both algorithms produce 32 bytes.
    pub fn digest(self, data: &[u8]) -> [u8; 32] {
        match self {
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
            HashAlgorithm::Sha256 => Sha256::digest(data).into(),
        }
    }
}

/// Configuration for [`Ed25519Crypto`](crate::Ed25519Crypto).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Hash function behind `compute_hash`.
    pub hash_algorithm: HashAlgorithm,
    /// Number of bytes returned by `random_bytes`.
    pub random_bytes_size: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Blake3,
            random_bytes_size: 256,
        }
    }
}

/// Configuration for [`FsKeyStore`](crate::FsKeyStore).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FsKeyStoreConfig {
    /// Directory holding one subdirectory per chain address.
    ///
    /// Defaults to the same root as the filesystem chain store, so a chain's
    /// records and keys share a directory.
    pub root_path: PathBuf,
}

impl Default for FsKeyStoreConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("ledgers"),
        }
    }
}

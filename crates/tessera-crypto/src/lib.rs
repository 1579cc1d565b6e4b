//! # Tessera Crypto
//!
//! Crypto providers for Tessera ledgers. A ledger never holds key material;
//! it asks its [`CryptoProvider`] for keys, random bytes, hashes and
//! signatures, scoped to the chain it operates on.
//!
//! ## Key Types
//!
//! - [`CryptoProvider`] - The async trait ledgers delegate to
//! - [`Ed25519Crypto`] - Ed25519 signatures with Blake3 or SHA-256 hashing
//! - [`KeyStore`] - Where per-chain keypairs come from
//! - [`MemoryKeyStore`] / [`FsKeyStore`] - Process-lifetime and on-disk keys
//!
//! ## Key Provisioning
//!
//! Each chain address gets its own keypair, generated on first use. The
//! filesystem store persists it under a directory derived from the address
//! and never regenerates it while a valid key file exists:
//!
//! ```text
//! <root>/<blake3-hex(address)>/private-keys/default   32-byte Ed25519 seed
//! <root>/<blake3-hex(address)>/public-keys/default    32-byte public key
//! ```

pub mod config;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod provider;

pub use config::{CryptoConfig, FsKeyStoreConfig, HashAlgorithm};
pub use error::{CryptoError, Result};
pub use keys::{verify_signature, Keypair, PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH};
pub use keystore::{FsKeyStore, KeyStore, MemoryKeyStore};
pub use provider::{CryptoProvider, Ed25519Crypto};

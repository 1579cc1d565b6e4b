//! Crypto provider trait and the Ed25519 implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;
use tessera_core::ChainRef;

use crate::config::CryptoConfig;
use crate::error::Result;
use crate::keystore::{FsKeyStore, KeyStore, MemoryKeyStore};

/// Async interface for chain-scoped cryptography.
///
/// Every call names the chain it serves, so a provider can select key
/// material per chain. Ledgers never cache what a provider returns: key
/// rotation on the provider side takes effect on the next call.
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    async fn private_key(&self, chain: &ChainRef) -> Result<Bytes>;

    async fn public_key(&self, chain: &ChainRef) -> Result<Bytes>;

    /// Fresh random bytes.
    async fn random_bytes(&self, chain: &ChainRef) -> Result<Bytes>;

    /// Content hash of `data`.
    async fn compute_hash(&self, chain: &ChainRef, data: &[u8]) -> Result<Bytes>;

    /// Signature over `data` with the chain's private key.
    async fn sign(&self, chain: &ChainRef, data: &[u8]) -> Result<Bytes>;
}

/// Ed25519 signing with a configurable content hash.
///
/// Keys come from a [`KeyStore`], one keypair per chain address.
#[derive(Debug)]
pub struct Ed25519Crypto<K> {
    keys: K,
    config: CryptoConfig,
}

impl<K: KeyStore> Ed25519Crypto<K> {
    pub fn new(keys: K, config: CryptoConfig) -> Self {
        Self { keys, config }
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn key_store(&self) -> &K {
        &self.keys
    }
}

impl Ed25519Crypto<MemoryKeyStore> {
    /// Provider with process-lifetime keys and default settings.
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyStore::new(), CryptoConfig::default())
    }
}

impl Ed25519Crypto<FsKeyStore> {
    /// Provider with keys persisted under `root` and default settings.
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self::new(FsKeyStore::open(root), CryptoConfig::default())
    }
}

#[async_trait]
impl<K: KeyStore> CryptoProvider for Ed25519Crypto<K> {
    async fn private_key(&self, chain: &ChainRef) -> Result<Bytes> {
        let keypair = self.keys.keypair(&chain.address).await?;
        Ok(Bytes::copy_from_slice(&keypair.seed()))
    }

    async fn public_key(&self, chain: &ChainRef) -> Result<Bytes> {
        let keypair = self.keys.keypair(&chain.address).await?;
        Ok(Bytes::copy_from_slice(&keypair.public_key()))
    }

    async fn random_bytes(&self, _chain: &ChainRef) -> Result<Bytes> {
        let mut bytes = vec![0u8; self.config.random_bytes_size];
        rand::thread_rng().fill_bytes(&mut bytes);
        Ok(Bytes::from(bytes))
    }

    async fn compute_hash(&self, _chain: &ChainRef, data: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(
            &self.config.hash_algorithm.digest(data),
        ))
    }

    async fn sign(&self, chain: &ChainRef, data: &[u8]) -> Result<Bytes> {
        let keypair = self.keys.keypair(&chain.address).await?;
        Ok(Bytes::copy_from_slice(&keypair.sign(data)))
    }
}

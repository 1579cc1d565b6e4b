//! Key stores: where per-chain keypairs come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tessera_core::Address;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::FsKeyStoreConfig;
use crate::error::{CryptoError, Result};
use crate::keys::{Keypair, SEED_LENGTH};

/// Directory under a chain's directory holding private key seeds.
pub const PRIVATE_KEYS_DIR: &str = "private-keys";
/// Directory under a chain's directory holding public keys.
pub const PUBLIC_KEYS_DIR: &str = "public-keys";
/// File name of the key in use.
pub const DEFAULT_KEY: &str = "default";

/// Source of the keypair bound to a chain address.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Load the keypair for `address`, provisioning one on first use.
    ///
    /// Later calls for the same address return the same keypair.
    async fn keypair(&self, address: &Address) -> Result<Keypair>;
}

/// Keys generated on demand and kept for the process lifetime.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: Mutex<HashMap<Address, Keypair>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a known keypair to an address.
    pub async fn insert(&self, address: Address, keypair: Keypair) {
        self.keys.lock().await.insert(address, keypair);
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn keypair(&self, address: &Address) -> Result<Keypair> {
        let mut keys = self.keys.lock().await;
        let keypair = keys.entry(address.clone()).or_insert_with(|| {
            tracing::debug!(address = %address, "provisioned in-memory keypair");
            Keypair::generate()
        });
        Ok(keypair.clone())
    }
}

/// Keys persisted on the local filesystem.
///
/// Layout per address:
///
/// ```text
/// <root>/<storage key>/private-keys/default   32-byte seed
/// <root>/<storage key>/public-keys/default    32-byte public key
/// ```
#[derive(Debug)]
pub struct FsKeyStore {
    config: FsKeyStoreConfig,
    // Serializes provisioning so two callers never generate rival keys.
    provisioning: Mutex<()>,
}

impl FsKeyStore {
    pub fn new(config: FsKeyStoreConfig) -> Self {
        Self {
            config,
            provisioning: Mutex::new(()),
        }
    }

    /// Key store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FsKeyStoreConfig {
            root_path: root.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root_path
    }

    pub fn private_key_path(&self, address: &Address) -> PathBuf {
        self.config
            .root_path
            .join(address.storage_key())
            .join(PRIVATE_KEYS_DIR)
            .join(DEFAULT_KEY)
    }

    pub fn public_key_path(&self, address: &Address) -> PathBuf {
        self.config
            .root_path
            .join(address.storage_key())
            .join(PUBLIC_KEYS_DIR)
            .join(DEFAULT_KEY)
    }

    async fn load(&self, path: &Path) -> Result<Option<Keypair>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let seed: [u8; SEED_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyFile {
                    path: path.to_path_buf(),
                    expected: SEED_LENGTH,
                    found: bytes.len(),
                })?;
        Ok(Some(Keypair::from_seed(&seed)))
    }

    async fn provision(&self, address: &Address) -> Result<Keypair> {
        let keypair = Keypair::generate();

        let private_path = self.private_key_path(address);
        let public_path = self.public_key_path(address);
        for path in [&private_path, &public_path] {
            if let Some(dir) = path.parent() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        // The private seed lands last: its presence marks a provisioned address.
        write_key(&public_path, &keypair.public_key(), false).await?;
        write_key(&private_path, &keypair.seed(), true).await?;

        tracing::debug!(address = %address, path = %private_path.display(), "provisioned keypair");
        Ok(keypair)
    }
}

/// Write a key file atomically, so readers never see a partial key.
async fn write_key(path: &Path, bytes: &[u8], private: bool) -> Result<()> {
    let staging = path.with_extension("tmp");

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(&staging).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    tokio::fs::rename(&staging, path).await?;
    Ok(())
}

#[async_trait]
impl KeyStore for FsKeyStore {
    async fn keypair(&self, address: &Address) -> Result<Keypair> {
        let path = self.private_key_path(address);
        if let Some(keypair) = self.load(&path).await? {
            return Ok(keypair);
        }

        let _provisioning = self.provisioning.lock().await;
        // Another caller may have provisioned while we waited.
        match self.load(&path).await? {
            Some(keypair) => Ok(keypair),
            None => self.provision(address).await,
        }
    }
}

//! Filesystem storage provider.
//!
//! Each chain is a single file at `<root>/<storage key>/ledger` holding one
//! JSON representation per line, in chain order. The storage key is the
//! hex blake3 digest of the chain address, so arbitrary address strings map
//! to safe directory names.
//!
//! Every record ends with a newline. A trailing segment without one is an
//! interrupted write: reads ignore it and the next append replaces it.
//!
//! All stores over the same root within one process share their chain
//! locks. Appends also check the record's index against the file, so a
//! writer holding a stale head gets [`StoreError::Conflict`] instead of
//! forking the chain. Separate processes sharing a root are not coordinated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use async_trait::async_trait;
use serde::Deserialize;
use tessera_core::{decode_line, encode_line, Address, AppendedFrame, ChainRef};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{Result, StoreError};
use crate::traits::{ChainGuard, ChainLocks, StorageProvider};

/// File name of a chain's record file inside its directory.
pub const LEDGER_FILE: &str = "ledger";

/// Chain locks of every live store, keyed by canonical root.
static ROOT_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Weak<ChainLocks>>>> = OnceLock::new();

/// Configuration for [`FsStore`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FsStoreConfig {
    /// Directory holding one subdirectory per chain.
    pub root_path: PathBuf,
    /// Flush file data to disk before an append returns.
    pub sync_on_append: bool,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("ledgers"),
            sync_on_append: true,
        }
    }
}

/// Newline-delimited JSON chains on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    config: FsStoreConfig,
    locks: Arc<ChainLocks>,
}

impl FsStore {
    pub fn new(config: FsStoreConfig) -> Self {
        let locks = shared_locks(&config.root_path);
        Self { config, locks }
    }

    /// Store rooted at `root` with default settings.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FsStoreConfig {
            root_path: root.into(),
            ..FsStoreConfig::default()
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root_path
    }

    /// Directory holding the chain at `address`.
    pub fn chain_dir(&self, address: &Address) -> PathBuf {
        self.config.root_path.join(address.storage_key())
    }

    /// Record file of the chain at `address`.
    pub fn ledger_path(&self, address: &Address) -> PathBuf {
        self.chain_dir(address).join(LEDGER_FILE)
    }

    async fn write_record(&self, file: &mut File, record: &[u8]) -> std::io::Result<()> {
        file.write_all(record).await?;
        file.flush().await?;
        if self.config.sync_on_append {
            file.sync_data().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for FsStore {
    async fn list_frames(&self, _party: &Address, address: &Address) -> Result<Vec<AppendedFrame>> {
        let path = self.ledger_path(address);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let frames = records(&contents)
            .map(|(line, record)| {
                decode_line(record).map_err(|source| StoreError::Representation {
                    address: address.to_string(),
                    line,
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let torn = contents.len() - complete_len(&contents);
        if torn > 0 {
            tracing::debug!(address = %address, bytes = torn, "ignoring unterminated record");
        }
        tracing::trace!(address = %address, frames = frames.len(), "read chain file");
        Ok(frames)
    }

    async fn append_frame(&self, chain: &ChainRef, frame: AppendedFrame) -> Result<AppendedFrame> {
        let dir = self.chain_dir(&chain.address);
        tokio::fs::create_dir_all(&dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(dir.join(LEDGER_FILE))
            .await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        let expected = records(&contents).count() as u64;
        if frame.index != expected {
            return Err(StoreError::Conflict {
                address: chain.address.to_string(),
                index: frame.index,
                expected,
            });
        }

        let complete = complete_len(&contents) as u64;
        if complete < contents.len() as u64 {
            tracing::warn!(
                chain = %chain,
                bytes = contents.len() as u64 - complete,
                "discarding unterminated record at end of chain file"
            );
            file.set_len(complete).await?;
        }

        let mut line = encode_line(&frame);
        line.push('\n');
        if let Err(e) = self.write_record(&mut file, line.as_bytes()).await {
            // Cut back to the last complete record so the chain stays readable.
            if let Err(truncate) = file.set_len(complete).await {
                tracing::error!(chain = %chain, error = %truncate, "failed to discard partial record");
            }
            return Err(e.into());
        }

        tracing::debug!(chain = %chain, index = frame.index, "appended frame to chain file");
        Ok(frame)
    }

    async fn lock_chain(&self, chain: &ChainRef) -> ChainGuard {
        self.locks.lock(&chain.address).await
    }
}

/// Length of the prefix of `contents` made of newline-terminated records.
fn complete_len(contents: &[u8]) -> usize {
    contents
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |last| last + 1)
}

/// Non-blank terminated records with their 1-based line numbers.
fn records(contents: &[u8]) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    contents[..complete_len(contents)]
        .split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, record)| !record.iter().all(u8::is_ascii_whitespace))
        .map(|(n, record)| (n + 1, record))
}

fn shared_locks(root: &Path) -> Arc<ChainLocks> {
    let key = canonical_root(root);
    let mut roots = ROOT_LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    roots.retain(|_, locks| locks.strong_count() > 0);

    if let Some(locks) = roots.get(&key).and_then(Weak::upgrade) {
        return locks;
    }
    let locks = Arc::new(ChainLocks::new());
    roots.insert(key, Arc::downgrade(&locks));
    locks
}

/// Absolute form of `root`, with symlinks resolved for the part that exists.
fn canonical_root(root: &Path) -> PathBuf {
    let absolute = match std::env::current_dir() {
        Ok(cwd) => cwd.join(root),
        Err(_) => root.to_path_buf(),
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(resolved, |path, name| path.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return absolute.clone(),
        }
    }
}

//! In-memory storage provider.
//!
//! Chains live in a map keyed by address and vanish with the store. Cloning
//! a `MemoryStore` shares the same chains, which lets several parties in a
//! test see one storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tessera_core::{Address, AppendedFrame, ChainRef};

use crate::error::{Result, StoreError};
use crate::traits::{ChainGuard, ChainLocks, StorageProvider};

#[derive(Debug, Default)]
struct Inner {
    chains: RwLock<HashMap<Address, Vec<AppendedFrame>>>,
    locks: ChainLocks,
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses of every chain holding at least one frame.
    pub fn addresses(&self) -> Result<Vec<Address>> {
        let chains = self.inner.chains.read().map_err(poisoned)?;
        Ok(chains.keys().cloned().collect())
    }

    /// Number of frames stored across all chains.
    pub fn frame_count(&self) -> Result<usize> {
        let chains = self.inner.chains.read().map_err(poisoned)?;
        Ok(chains.values().map(Vec::len).sum())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

#[async_trait]
impl StorageProvider for MemoryStore {
    async fn list_frames(&self, _party: &Address, address: &Address) -> Result<Vec<AppendedFrame>> {
        let chains = self.inner.chains.read().map_err(poisoned)?;
        Ok(chains.get(address).cloned().unwrap_or_default())
    }

    async fn append_frame(&self, chain: &ChainRef, frame: AppendedFrame) -> Result<AppendedFrame> {
        let mut chains = self.inner.chains.write().map_err(poisoned)?;
        let frames = chains.entry(chain.address.clone()).or_default();

        let expected = frames.len() as u64;
        if frame.index != expected {
            return Err(StoreError::Conflict {
                address: chain.address.to_string(),
                index: frame.index,
                expected,
            });
        }

        frames.push(frame.clone());
        tracing::debug!(chain = %chain, index = frame.index, "appended frame to memory chain");
        Ok(frame)
    }

    async fn lock_chain(&self, chain: &ChainRef) -> ChainGuard {
        self.inner.locks.lock(&chain.address).await
    }
}

//! Storage provider trait: the plugin boundary for chain persistence.
//!
//! Any conforming implementation (filesystem, in-memory, remote) can be
//! substituted without changing ledger behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tessera_core::{Address, AppendedFrame, ChainRef};

use crate::error::Result;

/// Exclusive right to append to one chain. Released on drop.
pub type ChainGuard = tokio::sync::OwnedMutexGuard<()>;

/// Async interface for chain persistence.
///
/// Implementations must be safe for concurrent use across many ledgers and
/// parties.
///
/// # Contract
///
/// - `list_frames` returns the full chain in order, or an empty sequence when
///   nothing was ever persisted for the address.
/// - `append_frame` persists durably before returning the stored frame. A
///   failure is returned as an error and leaves no partial record behind.
/// - `lock_chain` hands out at most one guard per chain address at a time.
///   The ledger holds it across reading the head and appending, which keeps
///   `index` and `previous_hash` consistent under concurrent writers.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// List every frame of the chain at `address`, in chain order.
    async fn list_frames(&self, party: &Address, address: &Address) -> Result<Vec<AppendedFrame>>;

    /// Persist an already-linked frame at the end of its chain.
    async fn append_frame(&self, chain: &ChainRef, frame: AppendedFrame) -> Result<AppendedFrame>;

    /// Wait for exclusive append access to a chain.
    async fn lock_chain(&self, chain: &ChainRef) -> ChainGuard;
}

/// One async mutex per chain address.
///
/// Backends embed this to satisfy the `lock_chain` contract. Chains are
/// addressed independently, so writers on different addresses never wait
/// for each other.
///
/// Only addresses with a live guard or a waiting writer are tracked. Idle
/// entries are dropped on the next call to [`ChainLocks::lock`], so the map
/// is bounded by the number of chains being appended to concurrently.
#[derive(Debug, Default)]
pub struct ChainLocks {
    locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChainLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the append guard for `address`.
    pub async fn lock(&self, address: &Address) -> ChainGuard {
        let lock = {
            // Entries are inserted and removed whole, so a poisoned guard still holds a usable map.
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // A count of one means no guard and no waiter references the mutex.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(address.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

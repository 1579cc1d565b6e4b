//! Backend wrappers that count calls.
//!
//! Wrap a real provider to assert how often a ledger reached its backends,
//! or that it never did.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tessera_core::{Address, AppendedFrame, ChainRef};
use tessera_crypto::CryptoProvider;
use tessera_store::{ChainGuard, StorageProvider};

/// Snapshot of storage calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub list_frames: usize,
    pub append_frame: usize,
    pub lock_chain: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.list_frames + self.append_frame + self.lock_chain
    }
}

/// Storage provider that counts calls before delegating.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    list_frames: AtomicUsize,
    append_frame: AtomicUsize,
    lock_chain: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            list_frames: AtomicUsize::new(0),
            append_frame: AtomicUsize::new(0),
            lock_chain: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            list_frames: self.list_frames.load(Ordering::SeqCst),
            append_frame: self.append_frame.load(Ordering::SeqCst),
            lock_chain: self.lock_chain.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl<S: StorageProvider> StorageProvider for CountingStore<S> {
    async fn list_frames(
        &self,
        party: &Address,
        address: &Address,
    ) -> tessera_store::Result<Vec<AppendedFrame>> {
        self.list_frames.fetch_add(1, Ordering::SeqCst);
        self.inner.list_frames(party, address).await
    }

    async fn append_frame(
        &self,
        chain: &ChainRef,
        frame: AppendedFrame,
    ) -> tessera_store::Result<AppendedFrame> {
        self.append_frame.fetch_add(1, Ordering::SeqCst);
        self.inner.append_frame(chain, frame).await
    }

    async fn lock_chain(&self, chain: &ChainRef) -> ChainGuard {
        self.lock_chain.fetch_add(1, Ordering::SeqCst);
        self.inner.lock_chain(chain).await
    }
}

/// Snapshot of crypto calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CryptoCalls {
    pub private_key: usize,
    pub public_key: usize,
    pub random_bytes: usize,
    pub compute_hash: usize,
    pub sign: usize,
}

impl CryptoCalls {
    pub fn total(&self) -> usize {
        self.private_key + self.public_key + self.random_bytes + self.compute_hash + self.sign
    }
}

/// Crypto provider that counts calls before delegating.
#[derive(Debug, Default)]
pub struct CountingCrypto<C> {
    inner: C,
    private_key: AtomicUsize,
    public_key: AtomicUsize,
    random_bytes: AtomicUsize,
    compute_hash: AtomicUsize,
    sign: AtomicUsize,
}

impl<C> CountingCrypto<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            private_key: AtomicUsize::new(0),
            public_key: AtomicUsize::new(0),
            random_bytes: AtomicUsize::new(0),
            compute_hash: AtomicUsize::new(0),
            sign: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn calls(&self) -> CryptoCalls {
        CryptoCalls {
            private_key: self.private_key.load(Ordering::SeqCst),
            public_key: self.public_key.load(Ordering::SeqCst),
            random_bytes: self.random_bytes.load(Ordering::SeqCst),
            compute_hash: self.compute_hash.load(Ordering::SeqCst),
            sign: self.sign.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl<C: CryptoProvider> CryptoProvider for CountingCrypto<C> {
    async fn private_key(&self, chain: &ChainRef) -> tessera_crypto::Result<Bytes> {
        self.private_key.fetch_add(1, Ordering::SeqCst);
        self.inner.private_key(chain).await
    }

    async fn public_key(&self, chain: &ChainRef) -> tessera_crypto::Result<Bytes> {
        self.public_key.fetch_add(1, Ordering::SeqCst);
        self.inner.public_key(chain).await
    }

    async fn random_bytes(&self, chain: &ChainRef) -> tessera_crypto::Result<Bytes> {
        self.random_bytes.fetch_add(1, Ordering::SeqCst);
        self.inner.random_bytes(chain).await
    }

    async fn compute_hash(&self, chain: &ChainRef, data: &[u8]) -> tessera_crypto::Result<Bytes> {
        self.compute_hash.fetch_add(1, Ordering::SeqCst);
        self.inner.compute_hash(chain, data).await
    }

    async fn sign(&self, chain: &ChainRef, data: &[u8]) -> tessera_crypto::Result<Bytes> {
        self.sign.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(chain, data).await
    }
}

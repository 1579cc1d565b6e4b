//! Ledger: a capability-scoped facade over one party's chain.
//!
//! A ledger holds no chain contents. Reads go to the storage provider every
//! time, since storage may be shared and written by others. Writes go
//! through a [`LedgerWriter`], which only exists for read-write ledgers.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tessera_core::{
    canonical_content, concat, Address, AppendedFrame, ChainRef, Frame, FrameBody, Serializable,
    Timestamp,
};
use tessera_crypto::CryptoProvider;
use tessera_store::StorageProvider;

use crate::config::LedgerConfig;
use crate::error::{Error, Result};

/// Access level a ledger was built with. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerMode {
    Read,
    ReadWrite,
}

impl LedgerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgerMode::Read => "read",
            LedgerMode::ReadWrite => "read-write",
        }
    }
}

impl fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backends available to a read-only ledger.
#[derive(Clone)]
pub struct ReadAccess {
    pub storage: Arc<dyn StorageProvider>,
}

/// Backends available to a read-write ledger.
#[derive(Clone)]
pub struct WriteAccess {
    pub storage: Arc<dyn StorageProvider>,
    pub crypto: Arc<dyn CryptoProvider>,
}

/// What a ledger may do, and with which backends.
#[derive(Clone)]
pub enum LedgerAccess {
    Read(ReadAccess),
    ReadWrite(WriteAccess),
}

impl LedgerAccess {
    pub fn read(storage: Arc<dyn StorageProvider>) -> Self {
        LedgerAccess::Read(ReadAccess { storage })
    }

    pub fn read_write(storage: Arc<dyn StorageProvider>, crypto: Arc<dyn CryptoProvider>) -> Self {
        LedgerAccess::ReadWrite(WriteAccess { storage, crypto })
    }

    pub fn mode(&self) -> LedgerMode {
        match self {
            LedgerAccess::Read(_) => LedgerMode::Read,
            LedgerAccess::ReadWrite(_) => LedgerMode::ReadWrite,
        }
    }

    fn storage(&self) -> &Arc<dyn StorageProvider> {
        match self {
            LedgerAccess::Read(access) => &access.storage,
            LedgerAccess::ReadWrite(access) => &access.storage,
        }
    }
}

impl fmt::Debug for LedgerAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerAccess({})", self.mode())
    }
}

/// One party's view of one chain.
pub struct Ledger {
    chain: ChainRef,
    access: LedgerAccess,
    config: LedgerConfig,
}

impl Ledger {
    pub fn new(party: Address, address: Address, access: LedgerAccess, config: LedgerConfig) -> Self {
        Self {
            chain: ChainRef::new(party, address),
            access,
            config,
        }
    }

    /// The party operating this ledger.
    pub fn party(&self) -> &Address {
        &self.chain.party
    }

    /// The ledger's own chain address.
    pub fn address(&self) -> &Address {
        &self.chain.address
    }

    pub fn chain(&self) -> &ChainRef {
        &self.chain
    }

    pub fn mode(&self) -> LedgerMode {
        self.access.mode()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Every frame of this ledger's chain, in order.
    pub async fn frames(&self) -> Result<Vec<AppendedFrame>> {
        self.frames_at(self.address()).await
    }

    /// Every frame of the chain at `address`, in order. Empty if none exists.
    pub async fn frames_at(&self, address: &Address) -> Result<Vec<AppendedFrame>> {
        Ok(self
            .access
            .storage()
            .list_frames(self.party(), address)
            .await?)
    }

    /// First frame of this chain matching `predicate`, scanning in chain order.
    pub async fn find_frame<P>(&self, predicate: P) -> Result<Option<AppendedFrame>>
    where
        P: FnMut(&AppendedFrame) -> bool,
    {
        self.find_frame_at(self.address(), predicate).await
    }

    pub async fn find_frame_at<P>(
        &self,
        address: &Address,
        mut predicate: P,
    ) -> Result<Option<AppendedFrame>>
    where
        P: FnMut(&AppendedFrame) -> bool,
    {
        Ok(self
            .frames_at(address)
            .await?
            .into_iter()
            .find(|frame| predicate(frame)))
    }

    /// The frame at chain position `index`.
    pub async fn frame(&self, index: u64) -> Result<Option<AppendedFrame>> {
        self.frame_at(self.address(), index).await
    }

    pub async fn frame_at(&self, address: &Address, index: u64) -> Result<Option<AppendedFrame>> {
        self.find_frame_at(address, |frame| frame.index == index)
            .await
    }

    /// The last frame of this chain, or `None` while it is empty.
    pub async fn head(&self) -> Result<Option<AppendedFrame>> {
        self.head_at(self.address()).await
    }

    pub async fn head_at(&self, address: &Address) -> Result<Option<AppendedFrame>> {
        Ok(self.frames_at(address).await?.pop())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Write capability for this ledger.
    ///
    /// Fails with [`Error::InvalidMode`] on a read-only ledger, before any
    /// backend is touched.
    pub fn writer(&self) -> Result<LedgerWriter<'_>> {
        match &self.access {
            LedgerAccess::ReadWrite(access) => Ok(LedgerWriter {
                ledger: self,
                access,
            }),
            LedgerAccess::Read(_) => Err(Error::InvalidMode {
                expected: LedgerMode::ReadWrite,
                actual: LedgerMode::Read,
            }),
        }
    }

    pub async fn private_key(&self) -> Result<Bytes> {
        self.writer()?.private_key().await
    }

    pub async fn public_key(&self) -> Result<Bytes> {
        self.writer()?.public_key().await
    }

    pub async fn nonce(&self) -> Result<Bytes> {
        self.writer()?.nonce().await
    }

    pub async fn hash(&self, parts: &[Serializable<'_>]) -> Result<Bytes> {
        self.writer()?.hash(parts).await
    }

    pub async fn sign(&self, parts: &[Serializable<'_>]) -> Result<Bytes> {
        self.writer()?.sign(parts).await
    }

    pub async fn seal(
        &self,
        body: FrameBody,
        nonce: Option<Bytes>,
        timestamp: Option<i64>,
    ) -> Result<Frame> {
        self.writer()?.seal(body, nonce, timestamp).await
    }

    pub async fn append(&self, frame: Frame) -> Result<AppendedFrame> {
        self.writer()?.append(frame).await
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("party", self.party())
            .field("address", self.address())
            .field("mode", &self.mode())
            .finish()
    }
}

/// Read-write operations of a ledger.
///
/// Only obtainable from [`Ledger::writer`] on a read-write ledger, so the
/// operations here need no mode check of their own. Key material is never
/// cached: every call asks the crypto provider again.
#[derive(Clone, Copy)]
pub struct LedgerWriter<'a> {
    ledger: &'a Ledger,
    access: &'a WriteAccess,
}

impl<'a> LedgerWriter<'a> {
    pub fn ledger(&self) -> &'a Ledger {
        self.ledger
    }

    fn chain(&self) -> &'a ChainRef {
        &self.ledger.chain
    }

    pub async fn private_key(&self) -> Result<Bytes> {
        Ok(self.access.crypto.private_key(self.chain()).await?)
    }

    pub async fn public_key(&self) -> Result<Bytes> {
        Ok(self.access.crypto.public_key(self.chain()).await?)
    }

    /// Fresh random bytes from the crypto provider, hashed into the chain's
    /// hash domain.
    pub async fn nonce(&self) -> Result<Bytes> {
        let random = self.access.crypto.random_bytes(self.chain()).await?;
        Ok(self.access.crypto.compute_hash(self.chain(), &random).await?)
    }

    /// Hash of the concatenated byte forms of `parts`, in order.
    pub async fn hash(&self, parts: &[Serializable<'_>]) -> Result<Bytes> {
        Ok(self
            .access
            .crypto
            .compute_hash(self.chain(), &concat(parts))
            .await?)
    }

    /// Signature over the concatenated byte forms of `parts`, in order.
    pub async fn sign(&self, parts: &[Serializable<'_>]) -> Result<Bytes> {
        Ok(self.access.crypto.sign(self.chain(), &concat(parts)).await?)
    }

    /// Build a frame whose hash covers its canonical content.
    ///
    /// `timestamp` is in integer milliseconds.
    pub async fn seal(
        &self,
        body: FrameBody,
        nonce: Option<Bytes>,
        timestamp: Option<i64>,
    ) -> Result<Frame> {
        let mut frame = Frame {
            hash: Bytes::new(),
            nonce,
            timestamp: timestamp.map(Timestamp::millis),
            body,
        };
        frame.hash = self.content_hash(&frame).await?;
        Ok(frame)
    }

    /// Link `frame` after the current head of this ledger's chain and store it.
    ///
    /// The chain's append guard is held from reading the head until the
    /// storage provider has persisted the frame.
    pub async fn append(&self, frame: Frame) -> Result<AppendedFrame> {
        if self.ledger.config.verify_hash_on_append {
            self.verify_hash(&frame).await?;
        }

        let storage = &self.access.storage;
        let chain = self.chain();

        let _guard = storage.lock_chain(chain).await;
        let head = storage
            .list_frames(&chain.party, &chain.address)
            .await?
            .pop();
        let appended = AppendedFrame::link(frame, head.as_ref());
        let stored = storage.append_frame(chain, appended).await?;

        tracing::debug!(
            chain = %chain,
            index = stored.index,
            kind = %stored.kind(),
            "appended frame"
        );
        Ok(stored)
    }

    async fn content_hash(&self, frame: &Frame) -> Result<Bytes> {
        Ok(self
            .access
            .crypto
            .compute_hash(self.chain(), &canonical_content(frame))
            .await?)
    }

    async fn verify_hash(&self, frame: &Frame) -> Result<()> {
        let computed = self.content_hash(frame).await?;
        if computed != frame.hash {
            return Err(Error::HashMismatch {
                claimed: hex::encode(&frame.hash),
                computed: hex::encode(&computed),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for LedgerWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerWriter")
            .field("chain", self.chain())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{FrameKind, GENESIS_HASH};
    use tessera_crypto::Ed25519Crypto;
    use tessera_store::MemoryStore;

    fn party() -> Address {
        Address::new("https://alice.example")
    }

    fn chain_address() -> Address {
        Address::new("file://ledgers/default")
    }

    fn read_write(store: &MemoryStore, config: LedgerConfig) -> Ledger {
        Ledger::new(
            party(),
            chain_address(),
            LedgerAccess::read_write(Arc::new(store.clone()), Arc::new(Ed25519Crypto::in_memory())),
            config,
        )
    }

    fn read_only(store: &MemoryStore) -> Ledger {
        Ledger::new(
            party(),
            chain_address(),
            LedgerAccess::read(Arc::new(store.clone())),
            LedgerConfig::default(),
        )
    }

    fn payload(data: &'static [u8]) -> FrameBody {
        FrameBody::Payload {
            payload: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        assert!(ledger.frames().await.unwrap().is_empty());
        assert!(ledger.head().await.unwrap().is_none());
        assert!(ledger.frame(0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_genesis_append() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        let frame = ledger.seal(payload(b"first"), None, None).await.unwrap();

        let appended = ledger.append(frame).await.unwrap();
        assert_eq!(appended.index, 0);
        assert_eq!(appended.previous_hash.as_ref(), GENESIS_HASH);
        assert!(appended.is_genesis());
    }

    #[tokio::test]
    async fn test_append_links_to_head() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());

        let mut previous: Option<AppendedFrame> = None;
        for data in [&b"a"[..], b"b", b"c"] {
            let frame = ledger
                .seal(
                    FrameBody::Payload {
                        payload: Bytes::copy_from_slice(data),
                    },
                    None,
                    None,
                )
                .await
                .unwrap();
            let appended = ledger.append(frame).await.unwrap();
            if let Some(previous) = &previous {
                assert!(appended.follows(previous));
            }
            previous = Some(appended);
        }

        let head = ledger.head().await.unwrap().unwrap();
        assert_eq!(head.index, 2);
        assert_eq!(Some(head), previous);
    }

    #[tokio::test]
    async fn test_find_and_frame_by_index() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        for data in [&b"a"[..], b"b"] {
            let frame = ledger
                .seal(
                    FrameBody::Payload {
                        payload: Bytes::copy_from_slice(data),
                    },
                    None,
                    None,
                )
                .await
                .unwrap();
            ledger.append(frame).await.unwrap();
        }

        let second = ledger.frame(1).await.unwrap().unwrap();
        assert_eq!(second.body().payload().unwrap().as_ref(), b"b");

        let found = ledger
            .find_frame(|f| f.body().payload().map(|p| p.as_ref()) == Some(&b"a"[..]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.index, 0);

        assert!(ledger
            .find_frame(|f| f.kind() == FrameKind::Hash)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reads_other_address() {
        let store = MemoryStore::new();
        let ledger = read_write(&store, LedgerConfig::default());
        let other = Ledger::new(
            party(),
            Address::new("file://ledgers/other"),
            LedgerAccess::read_write(Arc::new(store.clone()), Arc::new(Ed25519Crypto::in_memory())),
            LedgerConfig::default(),
        );

        let frame = other.seal(FrameBody::Hash, None, None).await.unwrap();
        other.append(frame).await.unwrap();

        assert!(ledger.frames().await.unwrap().is_empty());
        assert_eq!(ledger.frames_at(other.address()).await.unwrap().len(), 1);
        assert!(ledger.head_at(other.address()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let store = MemoryStore::new();
        let ledger = read_only(&store);

        let err = ledger.writer().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMode {
                expected: LedgerMode::ReadWrite,
                actual: LedgerMode::Read
            }
        ));

        let frame = Frame::new(Bytes::from_static(b"h"), FrameBody::Hash);
        assert!(ledger.append(frame).await.unwrap_err().is_invalid_mode());
        assert!(ledger.public_key().await.unwrap_err().is_invalid_mode());
        assert!(ledger.nonce().await.unwrap_err().is_invalid_mode());
        assert!(ledger.hash(&["x".into()]).await.unwrap_err().is_invalid_mode());
        assert_eq!(store.frame_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_only_sees_writes() {
        let store = MemoryStore::new();
        let writer = read_write(&store, LedgerConfig::default());
        let reader = read_only(&store);

        let frame = writer.seal(payload(b"shared"), None, None).await.unwrap();
        let appended = writer.append(frame).await.unwrap();

        assert_eq!(reader.head().await.unwrap(), Some(appended));
    }

    #[tokio::test]
    async fn test_hash_is_hash_of_concatenation() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        let split = ledger.hash(&["ab".into(), b"cd".into()]).await.unwrap();
        let joined = ledger.hash(&[b"abcd".into()]).await.unwrap();
        assert_eq!(split, joined);
    }

    #[tokio::test]
    async fn test_nonce_is_fresh() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        let a = ledger.nonce().await.unwrap();
        let b = ledger.nonce().await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn test_verify_hash_on_append() {
        let store = MemoryStore::new();
        let ledger = read_write(
            &store,
            LedgerConfig {
                verify_hash_on_append: true,
            },
        );

        let sealed = ledger.seal(payload(b"ok"), None, Some(7)).await.unwrap();
        ledger.append(sealed.clone()).await.unwrap();

        let mut forged = sealed;
        forged.body = payload(b"tampered");
        let err = ledger.append(forged).await.unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));
        assert_eq!(store.frame_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unverified_append_keeps_caller_hash() {
        let ledger = read_write(&MemoryStore::new(), LedgerConfig::default());
        let frame = Frame::new(Bytes::from_static(b"caller-chosen"), FrameBody::Hash);
        let appended = ledger.append(frame).await.unwrap();
        assert_eq!(appended.hash().as_ref(), b"caller-chosen");
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_chain_linked() {
        let store = MemoryStore::new();
        let ledger = Arc::new(read_write(&store, LedgerConfig::default()));

        let handles: Vec<_> = (0u8..16)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    let frame = ledger
                        .seal(
                            FrameBody::Payload {
                                payload: Bytes::from(vec![i]),
                            },
                            None,
                            None,
                        )
                        .await
                        .unwrap();
                    ledger.append(frame).await.unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let frames = ledger.frames().await.unwrap();
        assert_eq!(frames.len(), 16);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i as u64);
        }
        for pair in frames.windows(2) {
            assert!(pair[1].follows(&pair[0]));
        }
    }
}

//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use tessera::{Ledger, LedgerAccess, LedgerConfig, Party, TrustResponder};
use tessera_core::Address;
use tessera_crypto::{CryptoProvider, Ed25519Crypto};
use tessera_exchange::MemoryExchange;
use tessera_store::{MemoryStore, StorageProvider};

/// Chain address used by the ledger fixtures.
pub const TEST_LEDGER: &str = "file://ledgers/test";

/// Install a tracing subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .try_init();
}

/// Parties sharing one in-memory exchange.
///
/// Every party gets its own memory store and in-memory keys, and answers
/// trust offers through a [`TrustResponder`].
#[derive(Debug, Clone, Default)]
pub struct TestNetwork {
    pub exchange: MemoryExchange,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a private party and register it for incoming offers.
    pub async fn add_party(&self, address: &str) -> Arc<Party> {
        self.add_party_with(
            address,
            Arc::new(MemoryStore::new()),
            Arc::new(Ed25519Crypto::in_memory()),
        )
        .await
    }

    /// Add a private party with the given backends.
    pub async fn add_party_with(
        &self,
        address: &str,
        storage: Arc<dyn StorageProvider>,
        crypto: Arc<dyn CryptoProvider>,
    ) -> Arc<Party> {
        let party = Arc::new(
            Party::builder(address)
                .private(storage, crypto)
                .exchange(Arc::new(self.exchange.clone()))
                .build(),
        );
        self.exchange
            .register(party.address().clone(), Arc::new(TrustResponder::new(&party)))
            .await;
        party
    }

    /// Two registered parties, `alice` and `bob`.
    pub async fn pair(&self) -> (Arc<Party>, Arc<Party>) {
        let alice = self.add_party("https://alice.example").await;
        let bob = self.add_party("https://bob.example").await;
        (alice, bob)
    }
}

/// A read-write ledger at [`TEST_LEDGER`].
pub fn read_write_ledger(
    storage: Arc<dyn StorageProvider>,
    crypto: Arc<dyn CryptoProvider>,
    config: LedgerConfig,
) -> Ledger {
    Ledger::new(
        Address::new("https://alice.example"),
        Address::new(TEST_LEDGER),
        LedgerAccess::read_write(storage, crypto),
        config,
    )
}

/// A read-only ledger at [`TEST_LEDGER`].
pub fn read_only_ledger(storage: Arc<dyn StorageProvider>) -> Ledger {
    Ledger::new(
        Address::new("https://alice.example"),
        Address::new(TEST_LEDGER),
        LedgerAccess::read(storage),
        LedgerConfig::default(),
    )
}

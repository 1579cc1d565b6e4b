//! Party: an identity with a registry of ledgers and a set of trusted peers.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tessera_core::{Address, AppendedFrame};
use tessera_crypto::CryptoProvider;
use tessera_exchange::{Exchange, NoExchange};
use tessera_store::StorageProvider;

use crate::config::PartyConfig;
use crate::error::{Error, Result};
use crate::ledger::{Ledger, LedgerAccess, LedgerMode};

/// A participant in trust exchange.
///
/// Private parties get read-write ledgers, public parties read-only ones.
/// Ledgers are created on first use and cached for the party's lifetime.
pub struct Party {
    address: Address,
    access: Option<LedgerAccess>,
    exchange: Arc<dyn Exchange>,
    config: PartyConfig,
    ledgers: Mutex<HashMap<Address, Arc<Ledger>>>,
    trusted: RwLock<BTreeSet<Address>>,
}

impl Party {
    pub fn builder(address: impl Into<Address>) -> PartyBuilder {
        PartyBuilder::new(address.into())
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// Mode of the ledgers this party creates, if it was given one.
    pub fn mode(&self) -> Option<LedgerMode> {
        self.access.as_ref().map(LedgerAccess::mode)
    }

    /// The party's default ledger.
    pub fn ledger(&self) -> Result<Arc<Ledger>> {
        self.ledger_at(&self.config.default_ledger)
    }

    /// The ledger for `address`, created on first use.
    pub fn ledger_at(&self, address: &Address) -> Result<Arc<Ledger>> {
        let access = self.access.as_ref().ok_or(Error::ModeNotConfigured)?;

        // Entries are inserted whole, so the map stays usable after a poisoning panic.
        let mut ledgers = self.ledgers.lock().unwrap_or_else(PoisonError::into_inner);
        let ledger = ledgers.entry(address.clone()).or_insert_with(|| {
            tracing::debug!(party = %self.address, address = %address, mode = %access.mode(), "opened ledger");
            Arc::new(Ledger::new(
                self.address.clone(),
                address.clone(),
                access.clone(),
                self.config.ledger.clone(),
            ))
        });
        Ok(Arc::clone(ledger))
    }

    /// Send `frame` to its counterparty and return the answering frame.
    pub async fn exchange(&self, frame: AppendedFrame) -> Result<AppendedFrame> {
        tracing::debug!(party = %self.address, kind = %frame.kind(), index = frame.index, "exchanging frame");
        Ok(self.exchange.exchange(&self.address, frame).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Trust registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Addresses this party currently trusts, in sorted order.
    pub fn trusted_parties(&self) -> Vec<Address> {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Returns whether the address was newly trusted.
    pub fn trust(&self, address: Address) -> bool {
        self.trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address)
    }

    /// Returns whether the address was trusted before.
    pub fn revoke_trust(&self, address: &Address) -> bool {
        self.trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address)
    }

    pub fn is_trusted(&self, address: &Address) -> bool {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(address)
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("address", &self.address)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Party`].
pub struct PartyBuilder {
    address: Address,
    access: Option<LedgerAccess>,
    exchange: Arc<dyn Exchange>,
    trusted: BTreeSet<Address>,
    config: PartyConfig,
}

impl PartyBuilder {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            access: None,
            exchange: Arc::new(NoExchange),
            trusted: BTreeSet::new(),
            config: PartyConfig::default(),
        }
    }

    /// Read-write ledgers backed by `storage` and `crypto`.
    pub fn private(
        self,
        storage: Arc<dyn StorageProvider>,
        crypto: Arc<dyn CryptoProvider>,
    ) -> Self {
        self.access(LedgerAccess::read_write(storage, crypto))
    }

    /// Read-only ledgers backed by `storage`.
    pub fn public(self, storage: Arc<dyn StorageProvider>) -> Self {
        self.access(LedgerAccess::read(storage))
    }

    pub fn access(mut self, access: LedgerAccess) -> Self {
        self.access = Some(access);
        self
    }

    pub fn exchange(mut self, exchange: Arc<dyn Exchange>) -> Self {
        self.exchange = exchange;
        self
    }

    /// Addresses trusted from the start.
    pub fn trusted(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
        self.trusted.extend(addresses);
        self
    }

    pub fn config(mut self, config: PartyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Party {
        Party {
            address: self.address,
            access: self.access,
            exchange: self.exchange,
            config: self.config,
            ledgers: Mutex::new(HashMap::new()),
            trusted: RwLock::new(self.trusted),
        }
    }
}

//! # Tessera
//!
//! Tamper-evident, append-only ledgers for parties that exchange and record
//! trust relationships.
//!
//! ## Overview
//!
//! - **Frames**: records of five kinds (payload, trust exchange, trust
//!   acceptance, public-key acceptance, bare hash)
//! - **Ledgers**: one party's view of one chain. Appending links each frame
//!   to its predecessor's hash
//! - **Parties**: identities owning a ledger per address and a set of
//!   trusted peers
//! - **Handshake**: two parties record an offer and its acceptance on their
//!   own chains, each pointing at the other
//!
//! Ledgers hold no chain contents and no key material. Storage and
//! cryptography come from pluggable providers; see [`store`] and [`crypto`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tessera::crypto::Ed25519Crypto;
//! use tessera::exchange::MemoryExchange;
//! use tessera::store::FsStore;
//! use tessera::{offer_trust, Party, TrustResponder};
//!
//! async fn example() -> tessera::Result<()> {
//!     let exchange = MemoryExchange::new();
//!
//!     let alice = Arc::new(
//!         Party::builder("https://alice.example")
//!             .private(
//!                 Arc::new(FsStore::open("alice/ledgers")),
//!                 Arc::new(Ed25519Crypto::on_disk("alice/ledgers")),
//!             )
//!             .exchange(Arc::new(exchange.clone()))
//!             .build(),
//!     );
//!     let bob = Arc::new(
//!         Party::builder("https://bob.example")
//!             .private(
//!                 Arc::new(FsStore::open("bob/ledgers")),
//!                 Arc::new(Ed25519Crypto::on_disk("bob/ledgers")),
//!             )
//!             .exchange(Arc::new(exchange.clone()))
//!             .build(),
//!     );
//!     exchange
//!         .register(bob.address().clone(), Arc::new(TrustResponder::new(&bob)))
//!         .await;
//!
//!     // Alice's chain now ends with her offer, Bob's with his acceptance
//!     let handshake = offer_trust(&alice, bob.address()).await?;
//!     alice.trust(bob.address().clone());
//!
//!     let head = alice.ledger()?.head().await?;
//!     assert_eq!(head, Some(handshake.offer));
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `tessera::core` - Frames, addresses and the wire representation
//! - `tessera::store` - Storage providers
//! - `tessera::crypto` - Crypto providers and key stores
//! - `tessera::exchange` - Transports between parties

pub mod config;
pub mod error;
pub mod handshake;
pub mod ledger;
pub mod party;

pub use tessera_core as core;
pub use tessera_crypto as crypto;
pub use tessera_exchange as exchange;
pub use tessera_store as store;

pub use config::{LedgerConfig, PartyConfig, DEFAULT_LEDGER};
pub use error::{Error, Result};
pub use handshake::{accept_public_key, accept_trust, offer_trust, TrustOffer, TrustResponder};
pub use ledger::{Ledger, LedgerAccess, LedgerMode, LedgerWriter, ReadAccess, WriteAccess};
pub use party::{Party, PartyBuilder};

pub use tessera_core::{
    Address, AppendedFrame, ChainRef, Frame, FrameBody, FrameKind, Serializable, Timestamp,
};

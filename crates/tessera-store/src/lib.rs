//! # Tessera Store
//!
//! Storage providers for Tessera ledgers. The ledger never holds chain
//! contents itself; it reads and appends through the [`StorageProvider`]
//! trait implemented here.
//!
//! ## Key Types
//!
//! - [`StorageProvider`] - The async trait every backend implements
//! - [`ChainLocks`] - Per-address append serialization shared by backends
//! - [`MemoryStore`] - In-memory chains for tests and ephemeral parties
//! - [`FsStore`] - One newline-delimited JSON file per chain
//! - [`SqliteStore`] - SQLite-backed chains with index conflict detection
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tessera_core::{Address, ChainRef};
//! use tessera_store::{FsStore, StorageProvider};
//!
//! async fn example() {
//!     let store = FsStore::open("ledgers");
//!     let party = Address::new("https://alice.example");
//!     let address = Address::new("file://ledgers/default");
//!
//!     // A chain that was never written reads as empty
//!     let frames = store.list_frames(&party, &address).await.unwrap();
//!     assert!(frames.is_empty());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Missing chains are empty**: listing an address with no persisted
//!   records returns an empty sequence, never an error
//! - **Durable appends**: `append_frame` returns only after the record is
//!   persisted; failures propagate without partial writes
//! - **One writer per chain**: callers hold the guard from `lock_chain`
//!   across read-head and append

pub mod error;
pub mod fs;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::{FsStore, FsStoreConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ChainGuard, ChainLocks, StorageProvider};

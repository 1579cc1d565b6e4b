//! # Tessera Testkit
//!
//! Testing utilities for Tessera.
//!
//! ## Overview
//!
//! - **Fixtures**: parties wired to in-memory backends and one shared exchange
//! - **Counting stubs**: storage and crypto wrappers that record every call
//! - **Generators**: proptest strategies for frames and linked chains
//! - **Golden vectors**: fixed frames with their expected wire line,
//!   canonical content and SHA-256 content hash
//!
//! ## Golden Vectors
//!
//! ```rust
//! use tessera_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.expected_line);
//! }
//! assert!(verify_all_vectors().is_ok());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tessera_testkit::generators::linked_chain;
//!
//! proptest! {
//!     #[test]
//!     fn chains_are_linked(chain in linked_chain(16)) {
//!         for pair in chain.windows(2) {
//!             prop_assert!(pair[1].follows(&pair[0]));
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use tessera_testkit::fixtures::TestNetwork;
//!
//! async fn example() {
//!     let network = TestNetwork::new();
//!     let alice = network.add_party("https://alice.example").await;
//!     let bob = network.add_party("https://bob.example").await;
//!     let handshake = tessera::offer_trust(&alice, bob.address()).await.unwrap();
//! }
//! ```

pub mod counting;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use counting::{CountingCrypto, CountingStore, CryptoCalls, StoreCalls};
pub use fixtures::{init_tracing, read_only_ledger, read_write_ledger, TestNetwork};
pub use generators::{appended_frame, frame, frame_body, linked_chain};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

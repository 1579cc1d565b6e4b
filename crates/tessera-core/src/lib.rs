//! # Tessera Core
//!
//! Pure data model for Tessera ledgers: frames, chain linkage, and the
//! textual wire representation.
//!
//! This crate contains no I/O, no storage, no networking. Backends and the
//! ledger facade build on top of it.
//!
//! ## Key Types
//!
//! - [`Frame`] - One unit of chain content, tagged by [`FrameKind`]
//! - [`AppendedFrame`] - A frame with its chain position and predecessor link
//! - [`Address`] - Logical address of a chain or a party
//! - [`ChainRef`] - The `(party, address)` pair every backend call is scoped to
//! - [`Timestamp`] - Author-claimed time, any finite number kept exactly
//! - [`Serializable`] - Text or bytes accepted by ledger hashing and signing
//!
//! ## Wire Representation
//!
//! Frames travel and persist as JSON objects with base64 byte fields. See
//! the [`representation`] module.

pub mod canonical;
pub mod error;
pub mod frame;
pub mod representation;
pub mod serializable;
pub mod types;

pub use canonical::canonical_content;
pub use error::{RepresentationError, SerializableError};
pub use frame::{AppendedFrame, Frame, FrameBody, FrameKind, GENESIS_HASH, GENESIS_INDEX};
pub use representation::{
    appended_from_representation, appended_to_representation, decode_line, encode_line,
    frame_from_representation, frame_to_representation,
};
pub use serializable::{concat, Serializable};
pub use types::{Address, ChainRef, Timestamp};

//! # Tessera Exchange
//!
//! Delivery of appended frames between parties. A party hands a frame to its
//! [`Exchange`] and awaits the counterparty's answering frame; it never
//! looks inside how the frame travels.
//!
//! ## Key Types
//!
//! - [`Exchange`] - The transport a party sends through
//! - [`Responder`] - The receiving side, answering one frame with another
//! - [`MemoryExchange`] - In-process router from recipient address to responder
//! - [`FnExchange`] - Adapts an async closure into an exchange
//! - [`NoExchange`] - Fails every call, for parties that never send

pub mod error;
pub mod memory;
pub mod transport;

pub use error::{ExchangeError, Result};
pub use memory::MemoryExchange;
pub use transport::{Exchange, FnExchange, NoExchange, Responder};

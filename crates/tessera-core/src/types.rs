//! Strong type definitions for Tessera.
//!
//! Addresses are newtypes so a chain address can never be confused with an
//! arbitrary string at an API boundary.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Logical address of a chain or a party, usually URL-like
/// (`file://ledgers/default`, `https://example.com/alice`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic, filesystem-safe key derived from the address.
    ///
    /// Storage locations are content-derived: the hex Blake3 digest of the
    /// UTF-8 address, never the literal address.
    pub fn storage_key(&self) -> String {
        hex::encode(blake3::hash(self.0.as_bytes()).as_bytes())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// Identifies one chain as seen by one party.
///
/// Every storage and crypto backend call is scoped to a `ChainRef`, so a
/// backend can select records and key material per chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainRef {
    /// The party operating on the chain.
    pub party: Address,
    /// The chain's logical address.
    pub address: Address,
}

impl ChainRef {
    pub fn new(party: Address, address: Address) -> Self {
        Self { party, address }
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.party, self.address)
    }
}

/// Author-claimed time marker carried by a frame.
///
/// Usually integer milliseconds since the Unix epoch, but any finite JSON
/// number is kept exactly as written so that decoding and re-encoding a
/// frame never alters its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp(Number);

impl Timestamp {
    pub fn millis(millis: i64) -> Self {
        Self(Number::from(millis))
    }

    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self)
    }

    /// The value as integer milliseconds, if it is an `i64`.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self::millis(millis)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(Number::from(value))
    }
}

impl From<Number> for Timestamp {
    fn from(number: Number) -> Self {
        Self(number)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

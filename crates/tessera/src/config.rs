//! Ledger and party configuration.

use serde::Deserialize;
use tessera_core::Address;

/// Address of a party's ledger when none is named.
pub const DEFAULT_LEDGER: &str = "file://ledgers/default";

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Recompute each frame's content hash on append and reject a mismatch.
    pub verify_hash_on_append: bool,
}

/// Configuration for a [`Party`](crate::Party).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Ledger used by `Party::ledger`.
    pub default_ledger: Address,
    /// Applied to every ledger the party creates.
    pub ledger: LedgerConfig,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            default_ledger: Address::new(DEFAULT_LEDGER),
            ledger: LedgerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PartyConfig::default();
        assert_eq!(config.default_ledger.as_str(), DEFAULT_LEDGER);
        assert!(!config.ledger.verify_hash_on_append);
    }

    #[test]
    fn test_partial_document() {
        let config: PartyConfig =
            serde_json::from_str(r#"{ "ledger": { "verify_hash_on_append": true } }"#).unwrap();
        assert_eq!(config.default_ledger.as_str(), DEFAULT_LEDGER);
        assert!(config.ledger.verify_hash_on_append);
    }
}

//! Genesis document.
//!
//! The genesis document lists the chain address of every node in node id
//! order. Every node directory of a cluster carries a byte-identical copy,
//! so serialization must be a pure function of the address list.
//!
//! # Example
//!
//! ```json
//! {
//!   "addresses": [
//!     "0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01",
//!     "0x3E54B36f4F8EFaa017888E66fb6dB17098437ac7"
//!   ]
//! }
//! ```

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered validator address list shared by every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDocument {
    /// Chain addresses; position `i` belongs to node id `i + 1`.
    pub addresses: Vec<String>,
}

impl GenesisDocument {
    /// Create a genesis document from addresses in node id order.
    pub fn new(addresses: Vec<String>) -> Self {
        Self { addresses }
    }

    /// Number of validators.
    pub fn validator_count(&self) -> usize {
        self.addresses.len()
    }

    /// Address of the node with the given 1-based id.
    pub fn address_of(&self, id: u64) -> Option<&str> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.addresses.get(index).map(String::as_str)
    }

    /// Parse genesis from JSON string.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::Parse(e.to_string()))
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }

    /// Load genesis from a file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Save genesis to a file, truncating any existing content.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> GenesisDocument {
        GenesisDocument::new(vec![
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01".to_string(),
            "0x3E54B36f4F8EFaa017888E66fb6dB17098437ac7".to_string(),
        ])
    }

    #[test]
    fn test_genesis_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let addresses = value["addresses"].as_array().unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(
            addresses[0].as_str().unwrap(),
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01"
        );
        // Nothing besides the address list
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_genesis_serialization_is_stable() {
        assert_eq!(sample().to_json().unwrap(), sample().to_json().unwrap());
    }

    #[test]
    fn test_address_of_uses_one_based_ids() {
        let genesis = sample();
        assert_eq!(
            genesis.address_of(1),
            Some("0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01")
        );
        assert_eq!(
            genesis.address_of(2),
            Some("0x3E54B36f4F8EFaa017888E66fb6dB17098437ac7")
        );
        assert_eq!(genesis.address_of(0), None);
        assert_eq!(genesis.address_of(3), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genesis.json");

        sample().save(&path).unwrap();
        let loaded = GenesisDocument::load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GenesisDocument::load(Path::new("/nonexistent/genesis.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = GenesisDocument::from_json("{ not json }").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}

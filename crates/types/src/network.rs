//! Network topology document.
//!
//! Each node directory contains a `network.toml` describing the full peer
//! set. The `nodes` list is identical for every node of a cluster; only the
//! top-level `id` differs.
//!
//! ```toml
//! id = 1
//! n = 2
//!
//! [[nodes]]
//! id = 1
//! addr = "/ip4/127.0.0.1/tcp/4001/p2p/12D3KooW..."
//! pid = "12D3KooW..."
//! account = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01"
//! ```

use crate::cluster::NodeId;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

/// Build the multiaddress of a node: `/ip4/<ip>/tcp/<port>/p2p/<peer_id>`.
pub fn multiaddr(ip: Ipv4Addr, port: u16, peer_id: &str) -> String {
    format!("/ip4/{}/tcp/{}/p2p/{}", ip, port, peer_id)
}

/// One peer in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopologyEntry {
    /// Node id (1-based).
    pub id: NodeId,
    /// Multiaddress of the node.
    pub addr: String,
    /// Peer ID, also embedded in `addr`.
    pub pid: String,
    /// Chain address of the node.
    pub account: String,
}

/// Per-node view of the cluster topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopologyDocument {
    /// Id of the node owning this document.
    pub id: NodeId,
    /// Total number of nodes.
    pub n: u64,
    /// All peers in node id order.
    pub nodes: Vec<NetworkTopologyEntry>,
}

impl NetworkTopologyDocument {
    /// Entry of the owning node.
    pub fn self_entry(&self) -> Option<&NetworkTopologyEntry> {
        self.nodes.iter().find(|entry| entry.id == self.id)
    }

    /// Parse from TOML.
    pub fn from_toml(content: &str) -> Result<Self, DocumentError> {
        toml::from_str(content).map_err(|e| DocumentError::Parse(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, DocumentError> {
        toml::to_string_pretty(self).map_err(|e| DocumentError::Serialize(e.to_string()))
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Save to a file, truncating any existing content.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PID_1: &str = "12D3KooWDpJ7As7BWAwRMfu1VU2WCqNjvq387JEYKDBj4kx6nXTN";
    const PID_2: &str = "12D3KooWHHzSeKaY8xuZVzkLbKFfvNgPPeKhFBGrMbNzbm5akpqu";

    fn sample(self_id: NodeId) -> NetworkTopologyDocument {
        let ip = Ipv4Addr::LOCALHOST;
        NetworkTopologyDocument {
            id: self_id,
            n: 2,
            nodes: vec![
                NetworkTopologyEntry {
                    id: 1,
                    addr: multiaddr(ip, 4001, PID_1),
                    pid: PID_1.to_string(),
                    account: "0x742d35Cc6634C0532925a3b844Bc9e7595f0bC01".to_string(),
                },
                NetworkTopologyEntry {
                    id: 2,
                    addr: multiaddr(ip, 4002, PID_2),
                    pid: PID_2.to_string(),
                    account: "0x3E54B36f4F8EFaa017888E66fb6dB17098437ac7".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_multiaddr_format() {
        let addr = multiaddr(Ipv4Addr::new(10, 1, 2, 3), 4005, PID_1);
        assert_eq!(addr, format!("/ip4/10.1.2.3/tcp/4005/p2p/{}", PID_1));
    }

    #[test]
    fn test_toml_shape() {
        let toml_str = sample(2).to_toml().unwrap();
        let value: toml::Value = toml::from_str(&toml_str).unwrap();

        assert_eq!(value["id"].as_integer(), Some(2));
        assert_eq!(value["n"].as_integer(), Some(2));
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1]["id"].as_integer(), Some(2));
        assert!(nodes[1]["addr"].as_str().unwrap().ends_with(PID_2));
    }

    #[test]
    fn test_self_entry() {
        let doc = sample(2);
        assert_eq!(doc.self_entry().map(|e| e.pid.as_str()), Some(PID_2));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network.toml");

        sample(1).save(&path).unwrap();
        assert_eq!(NetworkTopologyDocument::load(&path).unwrap(), sample(1));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = NetworkTopologyDocument::from_toml("id = ").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}

//! Consistency checks for a generated cluster tree
//!
//! Re-derives every identity from the key files on disk and compares it with
//! what the shared documents claim, then validates each node's certificate
//! chain against the root certificate at the tree root.

use crate::config::{
    BootstrapConfig, ACCOUNT_KEY_FILENAME, AGENCY_CERT_FILENAME, AGENCY_KEY_FILENAME,
    CA_CERT_FILENAME, CA_KEY_FILENAME, CERTS_DIR, GENESIS_FILENAME, NETWORK_FILENAME,
    NODE_CERT_FILENAME, NODE_KEY_FILENAME,
};
use crate::error::{BootstrapError, Result};
use permnet_crypto::{address_from_key_file, peer_id_from_key_file, verify_chain};
use permnet_types::{GenesisDocument, NetworkTopologyDocument, NetworkTopologyEntry, NodeId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Verified identity of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedNode {
    /// Node id.
    pub id: NodeId,
    /// Node directory.
    pub dir: PathBuf,
    /// Multiaddress from the topology.
    pub addr: String,
    /// Chain address.
    pub address: String,
    /// Peer ID.
    pub peer_id: String,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Tree root.
    pub root: PathBuf,
    /// Nodes in id order.
    pub nodes: Vec<VerifiedNode>,
}

fn failed(message: impl Into<String>) -> BootstrapError {
    BootstrapError::Verification(message.into())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(BootstrapError::io("read", path))
}

/// Verify the tree at `root` using the default directory naming.
pub fn verify_cluster(root: &Path) -> Result<VerificationReport> {
    verify_cluster_with(root, &BootstrapConfig::default())
}

/// Verify the tree at `root`.
pub fn verify_cluster_with(root: &Path, config: &BootstrapConfig) -> Result<VerificationReport> {
    let ids = discover_nodes(root, config)?;
    let count = ids.len();
    info!("Verifying {} node cluster at {}", count, root.display());

    let root_ca = read(&root.join(CA_CERT_FILENAME))?;

    let mut expected_genesis: Option<Vec<u8>> = None;
    let mut expected_nodes: Option<Vec<NetworkTopologyEntry>> = None;
    let mut verified = Vec::with_capacity(count);

    for id in ids {
        let dir = root.join(config.node_dir_name(id));
        let certs = dir.join(CERTS_DIR);

        for secret in [CA_KEY_FILENAME, AGENCY_KEY_FILENAME] {
            if dir.join(secret).exists() || certs.join(secret).exists() {
                return Err(failed(format!("node {id} contains {secret}")));
            }
        }

        // Genesis: byte-identical everywhere
        let genesis_bytes = read(&dir.join(GENESIS_FILENAME))?;
        match &expected_genesis {
            Some(expected) if *expected != genesis_bytes => {
                return Err(failed(format!("genesis of node {id} differs from node 1")));
            }
            Some(_) => {}
            None => expected_genesis = Some(genesis_bytes.clone()),
        }
        let genesis = GenesisDocument::from_json(&String::from_utf8_lossy(&genesis_bytes))
            .map_err(BootstrapError::document(format!("parse genesis of node {id}")))?;
        if genesis.validator_count() != count {
            return Err(failed(format!(
                "genesis lists {} addresses for {count} nodes",
                genesis.validator_count()
            )));
        }

        // Network: own id, node count, identical peer list
        let network = NetworkTopologyDocument::load(&dir.join(NETWORK_FILENAME))
            .map_err(BootstrapError::document(format!("read network document of node {id}")))?;
        if network.id != id {
            return Err(failed(format!("network document of node {id} has id {}", network.id)));
        }
        if network.n != count as u64 || network.nodes.len() != count {
            return Err(failed(format!(
                "network document of node {id} has n = {}, {} entries; expected {count}",
                network.n,
                network.nodes.len()
            )));
        }
        match &expected_nodes {
            Some(expected) if *expected != network.nodes => {
                return Err(failed(format!("peer list of node {id} differs from node 1")));
            }
            Some(_) => {}
            None => expected_nodes = Some(network.nodes.clone()),
        }
        let entry = network
            .self_entry()
            .ok_or_else(|| failed(format!("network document of node {id} has no own entry")))?;

        // Identities re-derived from the key files
        let address = address_from_key_file(&dir.join(ACCOUNT_KEY_FILENAME))
            .map_err(BootstrapError::crypto(format!("derive address of node {id}")))?;
        if genesis.address_of(id) != Some(address.as_str()) || entry.account != address {
            return Err(failed(format!(
                "address of node {id} does not match key.priv ({address})"
            )));
        }
        let peer_id = peer_id_from_key_file(&certs.join(NODE_KEY_FILENAME))
            .map_err(BootstrapError::crypto(format!("derive peer ID of node {id}")))?
            .to_base58();
        if entry.pid != peer_id || !entry.addr.ends_with(&format!("/p2p/{peer_id}")) {
            return Err(failed(format!(
                "peer ID of node {id} does not match node.priv ({peer_id})"
            )));
        }

        // Certificates: root copy and chain
        if read(&certs.join(CA_CERT_FILENAME))? != root_ca {
            return Err(failed(format!("ca.cert of node {id} differs from the root copy")));
        }
        let agency = read(&certs.join(AGENCY_CERT_FILENAME))?;
        let leaf = read(&certs.join(NODE_CERT_FILENAME))?;
        verify_chain(&root_ca, &agency, &leaf)
            .map_err(|e| failed(format!("certificate chain of node {id}: {e}")))?;

        debug!("Node {} verified", id);
        verified.push(VerifiedNode {
            id,
            dir,
            addr: entry.addr.clone(),
            address,
            peer_id,
        });
    }

    Ok(VerificationReport {
        root: root.to_path_buf(),
        nodes: verified,
    })
}

/// Node ids found under `root`; must be exactly `1..=N`.
fn discover_nodes(root: &Path, config: &BootstrapConfig) -> Result<Vec<NodeId>> {
    let entries = fs::read_dir(root).map_err(BootstrapError::io("read directory", root))?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(BootstrapError::io("read directory", root))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let id = name
            .to_str()
            .and_then(|name| name.strip_prefix(config.node_dir_prefix.as_str()))
            .and_then(|suffix| suffix.parse::<NodeId>().ok());
        if let Some(id) = id {
            ids.push(id);
        }
    }
    ids.sort_unstable();

    if ids.is_empty() {
        return Err(failed(format!("no node directories in {}", root.display())));
    }
    for (index, id) in ids.iter().enumerate() {
        if *id != index as NodeId + 1 {
            return Err(failed(format!(
                "node directories are not numbered 1..={}; found {}",
                ids.len(),
                config.node_dir_name(*id)
            )));
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_requires_nodes() {
        let dir = TempDir::new().unwrap();
        let err = discover_nodes(dir.path(), &BootstrapConfig::default()).unwrap_err();
        assert!(matches!(err, BootstrapError::Verification(_)));
    }

    #[test]
    fn test_discover_ignores_other_entries() {
        let dir = TempDir::new().unwrap();
        for name in ["node2", "node1", "nodes", "other"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("node3"), "file, not a directory").unwrap();

        let ids = discover_nodes(dir.path(), &BootstrapConfig::default()).unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_discover_rejects_gaps() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("node1")).unwrap();
        fs::create_dir(dir.path().join("node3")).unwrap();

        let err = discover_nodes(dir.path(), &BootstrapConfig::default()).unwrap_err();
        assert!(err.to_string().contains("node3"));
    }
}

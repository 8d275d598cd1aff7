//! Shared cluster documents
//!
//! Built once every node identity exists: the genesis address list and the
//! network topology, both ordered by node id.

use crate::cluster::NodeIdentity;
use permnet_types::{
    multiaddr, GenesisDocument, NetworkTopologyDocument, NetworkTopologyEntry, NodeId,
};

/// Genesis and network documents of one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    genesis: GenesisDocument,
    entries: Vec<NetworkTopologyEntry>,
}

impl Topology {
    /// Build the documents from identities given in node id order.
    pub fn build(identities: &[NodeIdentity]) -> Self {
        let entries = identities
            .iter()
            .map(|node| NetworkTopologyEntry {
                id: node.id,
                addr: multiaddr(node.ip, node.port, &node.peer_id),
                pid: node.peer_id.clone(),
                account: node.address.clone(),
            })
            .collect();
        let genesis =
            GenesisDocument::new(identities.iter().map(|node| node.address.clone()).collect());

        Self { genesis, entries }
    }

    /// Genesis document shared by all nodes.
    pub fn genesis(&self) -> &GenesisDocument {
        &self.genesis
    }

    /// Topology entries, in node id order.
    pub fn entries(&self) -> &[NetworkTopologyEntry] {
        &self.entries
    }

    /// Network document as seen by node `id`.
    pub fn network_for(&self, id: NodeId) -> NetworkTopologyDocument {
        NetworkTopologyDocument {
            id,
            n: self.entries.len() as u64,
            nodes: self.entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::path::PathBuf;

    fn identity(id: NodeId, port: u16) -> NodeIdentity {
        NodeIdentity {
            id,
            organization: format!("Node{id}"),
            dir: PathBuf::from(format!("node{id}")),
            ip: Ipv4Addr::LOCALHOST,
            port,
            address: format!("0x{:040x}", id),
            peer_id: format!("12D3KooWPeer{id}"),
        }
    }

    #[test]
    fn test_documents_follow_node_order() {
        let identities: Vec<_> = (1..=3).map(|id| identity(id, 4000 + id as u16)).collect();
        let topology = Topology::build(&identities);

        assert_eq!(topology.genesis().validator_count(), 3);
        for (i, node) in identities.iter().enumerate() {
            assert_eq!(topology.genesis().addresses[i], node.address);
            assert_eq!(topology.entries()[i].id, node.id);
            assert_eq!(topology.entries()[i].pid, node.peer_id);
        }
        assert_eq!(
            topology.entries()[1].addr,
            "/ip4/127.0.0.1/tcp/4002/p2p/12D3KooWPeer2"
        );
    }

    #[test]
    fn test_network_documents_differ_only_in_id() {
        let identities: Vec<_> = (1..=4).map(|id| identity(id, 4000 + id as u16)).collect();
        let topology = Topology::build(&identities);

        let first = topology.network_for(1);
        for id in 1..=4 {
            let doc = topology.network_for(id);
            assert_eq!(doc.id, id);
            assert_eq!(doc.n, 4);
            assert_eq!(doc.nodes, first.nodes);
            assert_eq!(doc.self_entry().unwrap().id, id);
        }
    }
}

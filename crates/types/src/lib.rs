//! Core types for permnet cluster bootstrap.
//!
//! This crate provides the data structures shared between the provisioning
//! engine and anything that later consumes its output: the validated cluster
//! specification, the genesis document and the per-node network topology
//! document.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod cluster;
pub mod error;
pub mod genesis;
pub mod network;

pub use cluster::{ClusterSpec, NodeId, DEFAULT_NODE_IP, MAX_NODES};
pub use error::{ClusterSpecError, DocumentError};
pub use genesis::GenesisDocument;
pub use network::{multiaddr, NetworkTopologyDocument, NetworkTopologyEntry};

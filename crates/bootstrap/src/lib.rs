//! permctl - bootstrap and PKI provisioning for permnet test clusters
//!
//! Generates, for N nodes, a two-level certificate authority, per-node
//! network and account keys, a shared genesis document and per-node network
//! topology documents, laid out in one directory per node.

pub mod cluster;
pub mod config;
pub mod error;
pub mod ports;
pub mod topology;
pub mod verify;
pub mod writer;

pub use cluster::{ClusterGenerator, ClusterSummary, GenerateOptions, NodeIdentity};
pub use config::{
    BootstrapConfig, CertConfig, CONFIG_FILENAME, DEFAULT_BASE_PORT, DEFAULT_HOME_DIR,
    DEFAULT_OUTPUT_DIR, PERMCTL_HOME_ENV,
};
pub use error::BootstrapError;
pub use ports::{port_for, PortAllocator};
pub use topology::Topology;
pub use verify::{verify_cluster, verify_cluster_with, VerificationReport, VerifiedNode};
pub use writer::{ConfigWriter, NodeKeyPaths, NodeKeys};

//! Cluster generation
//!
//! Produces a complete cluster tree in one run:
//!
//! 1. Validate the input and assign ports (no filesystem or crypto work yet)
//! 2. Create the root and agency certificates
//! 3. Per node, in id order: issue the node certificate, generate the
//!    account key, write both keys, derive address and peer ID from the
//!    written key files
//! 4. Build the genesis and network documents from all identities
//! 5. Write certificates and documents into every node directory
//! 6. Publish the staged tree at the output root
//!
//! Everything is written to a staging directory next to the output root and
//! renamed into place at the end, so a failed run leaves the output root as
//! it was.
//!
//! # Usage
//!
//! ```rust,ignore
//! use permctl::{BootstrapConfig, ClusterGenerator, GenerateOptions};
//! use permnet_types::ClusterSpec;
//!
//! let spec = ClusterSpec::new(4, &["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"])?;
//! let options = GenerateOptions::new("./cluster");
//! let summary = ClusterGenerator::new(BootstrapConfig::default()).generate(&spec, &options)?;
//! ```

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};
use crate::ports::PortAllocator;
use crate::topology::Topology;
use crate::writer::{ConfigWriter, NodeKeys};
use permnet_crypto::{
    address_from_key_file, peer_id_from_key_file, CaMaterial, KeyAlgorithm, LeafRequest,
    PrivateKey,
};
use permnet_types::{ClusterSpec, NodeId};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Prefix of the staging directory created next to the output root.
const STAGING_PREFIX: &str = ".permctl-staging-";

/// Public identity of a generated node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Node id, 1-based position in the input list.
    pub id: NodeId,
    /// Certificate organization label.
    pub organization: String,
    /// Node directory under the output root.
    pub dir: PathBuf,
    /// Host IP.
    pub ip: Ipv4Addr,
    /// Listen port.
    pub port: u16,
    /// Chain address derived from `key.priv`.
    pub address: String,
    /// Peer ID derived from `certs/node.priv`.
    pub peer_id: String,
}

/// Where and how to write the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Output root directory.
    pub output_root: PathBuf,
    /// Replace an existing output root.
    pub overwrite: bool,
}

impl GenerateOptions {
    /// Options for a fresh output root.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            overwrite: false,
        }
    }

    /// Allow replacing an existing output root.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    /// Output root the cluster was published to.
    pub output_root: PathBuf,
    /// Nodes in id order.
    pub nodes: Vec<NodeIdentity>,
}

/// Generates cluster trees.
#[derive(Debug, Clone, Default)]
pub struct ClusterGenerator {
    config: BootstrapConfig,
}

impl ClusterGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Generate a cluster for `spec` and publish it at `options.output_root`.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::InvalidInput`] if ports overflow or the output root
    ///   does not end in a directory name (`.`, `..`, `/`); nothing is written
    /// - [`BootstrapError::OutputExists`] if the output root exists and
    ///   `options.overwrite` is false; nothing is written
    /// - any key, signing or I/O failure aborts the run and removes the
    ///   staging directory
    pub fn generate(&self, spec: &ClusterSpec, options: &GenerateOptions) -> Result<ClusterSummary> {
        self.config.validate()?;
        let ports = PortAllocator::allocate_all(self.config.base_port, spec.ips())?;

        let root = resolve_output_root(&options.output_root)?;
        let root = root.as_path();
        if root.exists() && !options.overwrite {
            return Err(BootstrapError::OutputExists(root.to_path_buf()));
        }

        let staging = create_staging_dir(root)?;
        info!(
            "Generating {} node cluster for {} (staging in {})",
            spec.count(),
            root.display(),
            staging.path().display()
        );

        let ca = CaMaterial::create(self.config.cert.subject())
            .map_err(BootstrapError::crypto("create certificate authority"))?;
        ConfigWriter::write_authority(staging.path(), &ca)?;
        info!("Created root and agency certificates");

        let mut identities = Vec::with_capacity(spec.count());
        let mut node_certs = Vec::with_capacity(spec.count());

        for ((id, ip), port) in spec.nodes().zip(ports) {
            let dir_name = self.config.node_dir_name(id);
            let organization = self.config.organization_label(id);
            let staged_dir = staging.path().join(&dir_name);

            let request = LeafRequest {
                name: &dir_name,
                organization: &organization,
                ip: Some(IpAddr::V4(ip)),
                is_ca: false,
            };
            let (network, cert) = ca
                .issue_leaf(&request)
                .map_err(BootstrapError::crypto(format!("issue certificate for node {id}")))?;
            let account = PrivateKey::generate(KeyAlgorithm::Secp256k1)
                .map_err(BootstrapError::crypto(format!("generate account key for node {id}")))?;

            let paths =
                ConfigWriter::write_node_keys(&staged_dir, &NodeKeys { network, account })?;

            // Identities come from the files, not from the keys in memory
            let address = address_from_key_file(&paths.account)
                .map_err(BootstrapError::crypto(format!("derive address of node {id}")))?;
            let peer_id = peer_id_from_key_file(&paths.network)
                .map_err(BootstrapError::crypto(format!("derive peer ID of node {id}")))?
                .to_base58();

            debug!(
                "Node {} ({}): {}:{} address={} peer_id={}",
                id, organization, ip, port, address, peer_id
            );

            identities.push(NodeIdentity {
                id,
                organization,
                dir: root.join(&dir_name),
                ip,
                port,
                address,
                peer_id,
            });
            node_certs.push(cert.pem());
        }

        let topology = Topology::build(&identities);
        for (node, cert_pem) in identities.iter().zip(&node_certs) {
            let staged_dir = staging.path().join(self.config.node_dir_name(node.id));
            ConfigWriter::write_node(
                &staged_dir,
                cert_pem,
                &ca,
                topology.genesis(),
                &topology.network_for(node.id),
            )?;
        }

        publish(staging, root, options.overwrite)?;
        info!(
            "Published {} node cluster to {}",
            identities.len(),
            root.display()
        );

        Ok(ClusterSummary {
            output_root: root.to_path_buf(),
            nodes: identities,
        })
    }
}

fn parent_dir(root: &Path) -> &Path {
    match root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Absolute output root: the canonical parent joined with the final name.
///
/// The staging directory is created in that parent, so it can never sit
/// inside the tree that publishing replaces.
fn resolve_output_root(root: &Path) -> Result<PathBuf> {
    let name = match root.components().next_back() {
        Some(Component::Normal(name)) => name.to_owned(),
        _ => {
            return Err(BootstrapError::InvalidInput {
                field: "output",
                reason: format!("{} does not end in a directory name", root.display()),
            })
        }
    };

    let parent = parent_dir(root);
    fs::create_dir_all(parent).map_err(BootstrapError::io("create directory", parent))?;
    let parent = fs::canonicalize(parent).map_err(BootstrapError::io("resolve directory", parent))?;
    Ok(parent.join(name))
}

fn create_staging_dir(root: &Path) -> Result<TempDir> {
    let parent = parent_dir(root);
    fs::create_dir_all(parent).map_err(BootstrapError::io("create directory", parent))?;
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(BootstrapError::io("create staging directory in", parent))
}

/// Move the staged tree to `root`, replacing a previous tree in full.
fn publish(staging: TempDir, root: &Path, overwrite: bool) -> Result<()> {
    if root.exists() {
        if !overwrite {
            return Err(BootstrapError::OutputExists(root.to_path_buf()));
        }
        fs::remove_dir_all(root).map_err(BootstrapError::io("remove previous cluster", root))?;
        debug!("Removed previous cluster at {}", root.display());
    }

    fs::rename(staging.path(), root).map_err(BootstrapError::io("publish cluster to", root))?;
    // Staging path no longer exists; the guard's cleanup is a no-op
    drop(staging);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir_of_relative_root() {
        assert_eq!(parent_dir(Path::new("cluster")), Path::new("."));
        assert_eq!(parent_dir(Path::new("out/cluster")), Path::new("out"));
    }

    #[test]
    fn test_output_root_must_end_in_a_name() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("work")).unwrap();

        for root in [
            PathBuf::from("."),
            PathBuf::from(".."),
            PathBuf::from("/"),
            dir.path().join(".."),
            dir.path().join("work").join(".."),
        ] {
            let err = resolve_output_root(&root).unwrap_err();
            assert!(
                matches!(err, BootstrapError::InvalidInput { field: "output", .. }),
                "{} accepted",
                root.display()
            );
        }
    }

    #[test]
    fn test_output_root_resolves_through_parent() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("work")).unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();

        let resolved = resolve_output_root(&dir.path().join("work/../cluster")).unwrap();
        assert_eq!(resolved, base.join("cluster"));

        // A trailing `.` names the directory itself
        let resolved = resolve_output_root(&dir.path().join("work/.")).unwrap();
        assert_eq!(resolved, base.join("work"));
    }

    #[test]
    fn test_staging_dir_is_sibling() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("cluster");

        let staging = create_staging_dir(&root).unwrap();
        assert_eq!(staging.path().parent(), Some(dir.path()));
        let name = staging.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(STAGING_PREFIX));
    }

    #[test]
    fn test_publish_replaces_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("cluster");
        fs::create_dir_all(root.join("stale")).unwrap();

        let staging = create_staging_dir(&root).unwrap();
        fs::write(staging.path().join("fresh"), "x").unwrap();
        publish(staging, &root, true).unwrap();

        assert!(root.join("fresh").is_file());
        assert!(!root.join("stale").exists());
    }

    #[test]
    fn test_dropped_staging_is_removed() {
        let dir = TempDir::new().unwrap();
        let staging = create_staging_dir(&dir.path().join("cluster")).unwrap();
        let path = staging.path().to_path_buf();

        drop(staging);
        assert!(!path.exists());
    }
}

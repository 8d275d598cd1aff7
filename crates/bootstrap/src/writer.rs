//! On-disk layout of a generated cluster
//!
//! ```text
//! <root>/ca.priv, ca.cert, agency.priv, agency.cert
//! <root>/node<i>/key.priv
//! <root>/node<i>/certs/node.priv, node.cert, ca.cert, agency.cert
//! <root>/node<i>/genesis.json, network.toml
//! ```
//!
//! Every write creates or truncates. Private keys are written with mode
//! `0600` on Unix.

use crate::config::{
    ACCOUNT_KEY_FILENAME, AGENCY_CERT_FILENAME, AGENCY_KEY_FILENAME, CA_CERT_FILENAME,
    CA_KEY_FILENAME, CERTS_DIR, GENESIS_FILENAME, NETWORK_FILENAME, NODE_CERT_FILENAME,
    NODE_KEY_FILENAME,
};
use crate::error::{BootstrapError, Result};
use permnet_crypto::{CaMaterial, PrivateKey};
use permnet_types::{GenesisDocument, NetworkTopologyDocument};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Private keys of one node.
#[derive(Debug)]
pub struct NodeKeys {
    /// Ed25519 network key, subject key of the node certificate.
    pub network: PrivateKey,
    /// secp256k1 account key.
    pub account: PrivateKey,
}

/// Where [`ConfigWriter::write_node_keys`] put the keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKeyPaths {
    /// `certs/node.priv`
    pub network: PathBuf,
    /// `key.priv`
    pub account: PathBuf,
}

/// Writes keys, certificates and documents into a cluster tree.
pub struct ConfigWriter;

impl ConfigWriter {
    /// Write the root and agency material at the tree root.
    pub fn write_authority(root: &Path, ca: &CaMaterial) -> Result<()> {
        create_dir(root)?;
        write_private_key(&root.join(CA_KEY_FILENAME), ca.root_key(), "root CA key")?;
        write_file(&root.join(CA_CERT_FILENAME), ca.root_cert_pem().as_bytes())?;
        write_private_key(&root.join(AGENCY_KEY_FILENAME), ca.agency_key(), "agency key")?;
        write_file(&root.join(AGENCY_CERT_FILENAME), ca.agency_cert_pem().as_bytes())?;
        debug!("Wrote CA material to {}", root.display());
        Ok(())
    }

    /// Create the node directory and write both private keys.
    pub fn write_node_keys(dir: &Path, keys: &NodeKeys) -> Result<NodeKeyPaths> {
        let certs_dir = dir.join(CERTS_DIR);
        create_dir(&certs_dir)?;

        let paths = NodeKeyPaths {
            network: certs_dir.join(NODE_KEY_FILENAME),
            account: dir.join(ACCOUNT_KEY_FILENAME),
        };
        write_private_key(&paths.network, &keys.network, "network key")?;
        write_private_key(&paths.account, &keys.account, "account key")?;
        Ok(paths)
    }

    /// Write the node certificate, CA certificate copies and shared
    /// documents. Never writes `ca.priv` or `agency.priv`.
    pub fn write_node(
        dir: &Path,
        node_cert_pem: &str,
        ca: &CaMaterial,
        genesis: &GenesisDocument,
        network: &NetworkTopologyDocument,
    ) -> Result<()> {
        let certs_dir = dir.join(CERTS_DIR);
        create_dir(&certs_dir)?;

        write_file(&certs_dir.join(NODE_CERT_FILENAME), node_cert_pem.as_bytes())?;
        write_file(&certs_dir.join(CA_CERT_FILENAME), ca.root_cert_pem().as_bytes())?;
        write_file(&certs_dir.join(AGENCY_CERT_FILENAME), ca.agency_cert_pem().as_bytes())?;

        genesis
            .save(&dir.join(GENESIS_FILENAME))
            .map_err(BootstrapError::document("write genesis document"))?;
        network
            .save(&dir.join(NETWORK_FILENAME))
            .map_err(BootstrapError::document("write network document"))?;

        debug!("Wrote node files to {}", dir.display());
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(BootstrapError::io("create directory", path))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(BootstrapError::io("write", path))
}

fn write_private_key(path: &Path, key: &PrivateKey, what: &str) -> Result<()> {
    let pem = key
        .to_pem()
        .map_err(BootstrapError::crypto(format!("encode {what}")))?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(BootstrapError::io("create", path))?;
    file.write_all(pem.as_bytes())
        .map_err(BootstrapError::io("write", path))?;

    // mode() only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(BootstrapError::io("set permissions on", path))?;
    }
    Ok(())
}

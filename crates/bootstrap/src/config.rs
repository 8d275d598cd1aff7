//! Bootstrap configuration
//!
//! Settings that rarely change between runs live in `{home}/config.toml`;
//! per-run inputs (node count, IPs, output directory) are CLI flags.
//!
//! # Example config.toml
//!
//! ```toml
//! # First port handed out on each host is base-port + 1
//! base-port = 4000
//!
//! # Node directories are named <node-dir-prefix><id>
//! node-dir-prefix = "node"
//!
//! # Certificate organization of node <id> is <organization-prefix><id>
//! organization-prefix = "Node"
//!
//! [cert]
//! country = "CN"
//! province = "ZJ"
//! locality = "HZ"
//! organization = "permnet"
//! validity-days = 3650
//! ```

use crate::error::{BootstrapError, Result};
use permnet_crypto::CertSubject;
use permnet_types::NodeId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable for home directory override.
///
/// When set, this environment variable takes precedence over the default
/// home directory (`~/.permctl`).
///
/// # Example
///
/// ```bash
/// export PERMCTL_HOME=/custom/path/permctl
/// permctl init -n 4
/// ```
pub const PERMCTL_HOME_ENV: &str = "PERMCTL_HOME";

/// Default home directory name (relative to user's home directory).
pub const DEFAULT_HOME_DIR: &str = ".permctl";

/// Configuration filename inside the home directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default output directory inside the home directory.
pub const DEFAULT_OUTPUT_DIR: &str = "cluster";

/// Default base port.
pub const DEFAULT_BASE_PORT: u16 = 4000;

/// Root CA private key filename.
pub const CA_KEY_FILENAME: &str = "ca.priv";
/// Root CA certificate filename.
pub const CA_CERT_FILENAME: &str = "ca.cert";
/// Agency private key filename.
pub const AGENCY_KEY_FILENAME: &str = "agency.priv";
/// Agency certificate filename.
pub const AGENCY_CERT_FILENAME: &str = "agency.cert";
/// Certificate directory inside each node directory.
pub const CERTS_DIR: &str = "certs";
/// Node network key filename, inside [`CERTS_DIR`].
pub const NODE_KEY_FILENAME: &str = "node.priv";
/// Node certificate filename, inside [`CERTS_DIR`].
pub const NODE_CERT_FILENAME: &str = "node.cert";
/// Account key filename inside each node directory.
pub const ACCOUNT_KEY_FILENAME: &str = "key.priv";
/// Genesis document filename.
pub const GENESIS_FILENAME: &str = "genesis.json";
/// Network topology document filename.
pub const NETWORK_FILENAME: &str = "network.toml";

/// Certificate subject settings (`[cert]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CertConfig {
    /// Country (C).
    #[serde(default = "default_country")]
    pub country: String,

    /// State or province (ST).
    #[serde(default = "default_province")]
    pub province: String,

    /// Locality (L).
    #[serde(default = "default_locality")]
    pub locality: String,

    /// Organization of the root and agency certificates.
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Certificate validity in days.
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

fn default_country() -> String {
    "CN".to_string()
}

fn default_province() -> String {
    "ZJ".to_string()
}

fn default_locality() -> String {
    "HZ".to_string()
}

fn default_organization() -> String {
    "permnet".to_string()
}

fn default_validity_days() -> u32 {
    3650
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            province: default_province(),
            locality: default_locality(),
            organization: default_organization(),
            validity_days: default_validity_days(),
        }
    }
}

impl CertConfig {
    /// Subject handed to the certificate authority.
    pub fn subject(&self) -> CertSubject {
        CertSubject {
            country: self.country.clone(),
            province: self.province.clone(),
            locality: self.locality.clone(),
            organization: self.organization.clone(),
            validity_days: self.validity_days,
        }
    }
}

/// Bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BootstrapConfig {
    /// Base port; the k-th node on a host listens on `base-port + k`.
    #[serde(default = "default_base_port")]
    pub base_port: u16,

    /// Prefix of node directory names.
    #[serde(default = "default_node_dir_prefix")]
    pub node_dir_prefix: String,

    /// Prefix of node certificate organization labels.
    #[serde(default = "default_organization_prefix")]
    pub organization_prefix: String,

    /// Certificate subject settings.
    #[serde(default)]
    pub cert: CertConfig,
}

fn default_base_port() -> u16 {
    DEFAULT_BASE_PORT
}

fn default_node_dir_prefix() -> String {
    "node".to_string()
}

fn default_organization_prefix() -> String {
    "Node".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            base_port: default_base_port(),
            node_dir_prefix: default_node_dir_prefix(),
            organization_prefix: default_organization_prefix(),
            cert: CertConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Get the path to the config file.
    pub fn config_path(home: &Path) -> PathBuf {
        home.join(CONFIG_FILENAME)
    }

    /// Load configuration from file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            BootstrapError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            BootstrapError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(BootstrapError::io("create config directory", parent))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(BootstrapError::io("write config", path))
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BootstrapError::Config(format!("failed to serialize config: {e}")))
    }

    /// Reject settings that cannot produce a usable tree.
    pub fn validate(&self) -> Result<()> {
        if self.node_dir_prefix.is_empty() {
            return Err(BootstrapError::Config(
                "node-dir-prefix must not be empty".to_string(),
            ));
        }
        if self.node_dir_prefix.contains(['/', '\\']) {
            return Err(BootstrapError::Config(format!(
                "node-dir-prefix {:?} must not contain path separators",
                self.node_dir_prefix
            )));
        }
        if self.cert.validity_days == 0 {
            return Err(BootstrapError::Config(
                "cert.validity-days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory name of a node, e.g. `node3`.
    pub fn node_dir_name(&self, id: NodeId) -> String {
        format!("{}{}", self.node_dir_prefix, id)
    }

    /// Certificate organization label of a node, e.g. `Node3`.
    pub fn organization_label(&self, id: NodeId) -> String {
        format!("{}{}", self.organization_prefix, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BootstrapConfig::default();
        assert_eq!(config.base_port, 4000);
        assert_eq!(config.node_dir_name(1), "node1");
        assert_eq!(config.organization_label(2), "Node2");
        assert_eq!(config.cert.validity_days, 3650);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let config = BootstrapConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, BootstrapConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = BootstrapConfig::config_path(dir.path());

        let mut config = BootstrapConfig::default();
        config.base_port = 5000;
        config.cert.organization = "acme".to_string();
        config.save(&path).unwrap();

        let loaded = BootstrapConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "base-port = 7000\n[cert]\ncountry = \"DE\"\n").unwrap();

        let config = BootstrapConfig::load(&path).unwrap();
        assert_eq!(config.base_port, 7000);
        assert_eq!(config.node_dir_prefix, "node");
        assert_eq!(config.cert.country, "DE");
        assert_eq!(config.cert.validity_days, 3650);
    }

    #[test]
    fn test_kebab_case_keys() {
        let toml = BootstrapConfig::default().to_toml().unwrap();
        assert!(toml.contains("base-port"));
        assert!(toml.contains("node-dir-prefix"));
        assert!(toml.contains("validity-days"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "base-port = \"many\"").unwrap();

        let err = BootstrapConfig::load(&path).unwrap_err();
        assert!(matches!(err, BootstrapError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let config = BootstrapConfig {
            node_dir_prefix: "a/b".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Bootstrap error types

use permnet_crypto::CryptoError;
use permnet_types::{ClusterSpecError, DocumentError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while generating or verifying a cluster
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Input rejected before any file or key was created
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Offending input
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Output root exists and overwrite was not requested
    #[error("output directory {} already exists (use --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    /// Key generation, signing or key parsing failed
    #[error("failed to {op}: {source}")]
    Crypto {
        /// Step that failed
        op: String,
        /// Underlying error
        #[source]
        source: CryptoError,
    },

    /// Filesystem operation failed
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        /// Step that failed
        op: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Genesis or network document could not be encoded or decoded
    #[error("failed to {op}: {source}")]
    Document {
        /// Step that failed
        op: String,
        /// Underlying error
        #[source]
        source: DocumentError,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Generated tree failed a consistency check
    #[error("verification failed: {0}")]
    Verification(String),
}

impl BootstrapError {
    pub(crate) fn crypto(op: impl Into<String>) -> impl FnOnce(CryptoError) -> Self {
        let op = op.into();
        move |source| Self::Crypto { op, source }
    }

    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }

    pub(crate) fn document(op: impl Into<String>) -> impl FnOnce(DocumentError) -> Self {
        let op = op.into();
        move |source| Self::Document { op, source }
    }
}

impl From<ClusterSpecError> for BootstrapError {
    fn from(err: ClusterSpecError) -> Self {
        let field = match err {
            ClusterSpecError::ZeroCount | ClusterSpecError::TooManyNodes { .. } => "count",
            ClusterSpecError::IpCountMismatch { .. } | ClusterSpecError::InvalidIp { .. } => "ips",
        };
        Self::InvalidInput {
            field,
            reason: err.to_string(),
        }
    }
}

/// Result alias for bootstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_spec_error_maps_to_invalid_input() {
        let err: BootstrapError = ClusterSpecError::ZeroCount.into();
        assert!(matches!(err, BootstrapError::InvalidInput { field: "count", .. }));

        let err: BootstrapError = ClusterSpecError::TooManyNodes {
            count: 70000,
            max: 65535,
        }
        .into();
        assert!(matches!(err, BootstrapError::InvalidInput { field: "count", .. }));

        let err: BootstrapError = ClusterSpecError::InvalidIp {
            position: 1,
            value: "not-an-ip".to_string(),
        }
        .into();
        assert!(matches!(err, BootstrapError::InvalidInput { field: "ips", .. }));
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_output_exists_message() {
        let err = BootstrapError::OutputExists(PathBuf::from("/tmp/cluster"));
        assert!(err.to_string().contains("/tmp/cluster"));
        assert!(err.to_string().contains("--overwrite"));
    }
}

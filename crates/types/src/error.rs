//! Error types for cluster specifications and bootstrap documents.

use thiserror::Error;

/// Reasons a cluster specification is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterSpecError {
    /// Node count must be positive.
    #[error("node count must be greater than zero")]
    ZeroCount,

    /// More nodes than ports on a single host.
    #[error("node count {count} exceeds the maximum of {max}")]
    TooManyNodes {
        /// Requested node count.
        count: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// A non-empty IP list must name exactly one IP per node.
    #[error("expected {expected} IP addresses, got {actual}")]
    IpCountMismatch {
        /// Requested node count.
        expected: usize,
        /// Number of IPs supplied.
        actual: usize,
    },

    /// An entry is not a dotted-quad IPv4 address.
    #[error("invalid IPv4 address at position {position}: {value:?}")]
    InvalidIp {
        /// 1-based position in the input list.
        position: usize,
        /// The rejected input.
        value: String,
    },
}

/// Errors reading or writing genesis and network documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// I/O error reading or writing a document file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The document could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(String),
}

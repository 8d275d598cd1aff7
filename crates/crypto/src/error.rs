//! Cryptographic error types

use thiserror::Error;

/// Key, certificate and identity errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key generation failed (random source or algorithm unavailable)
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Key material could not be parsed or has the wrong algorithm
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Key or certificate could not be encoded
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Certificate or CSR signing failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Certificate could not be parsed
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// Certificate chain verification failed
    #[error("verification failed: {0}")]
    Verification(String),

    /// Key file could not be read
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

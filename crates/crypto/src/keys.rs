//! Key generation and PEM encoding
//!
//! Three key algorithms are used when bootstrapping a cluster:
//!
//! | Algorithm   | Purpose                                   | PEM container | Label            |
//! |-------------|-------------------------------------------|---------------|------------------|
//! | `Secp256k1` | account / transaction signing             | SEC1          | `EC PRIVATE KEY` |
//! | `Ed25519`   | network peer identity and node TLS cert   | PKCS#8        | `PRIVATE KEY`    |
//! | `EcdsaP256` | root and agency certificate authorities   | PKCS#8        | `PRIVATE KEY`    |
//!
//! Keys live in memory only; writing them to disk is the caller's job.

use crate::error::CryptoError;
use crate::secp256k1;
use rcgen::{KeyPair, SignatureAlgorithm, PKCS_ECDSA_P256_SHA256, PKCS_ED25519};
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// PEM label for SEC1 encoded secp256k1 keys.
pub const SEC1_PEM_LABEL: &str = "EC PRIVATE KEY";

/// PEM label for PKCS#8 encoded keys.
pub const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// Supported private key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// secp256k1 ECDSA, used for chain accounts.
    Secp256k1,
    /// Ed25519, used for libp2p peer identity and node certificates.
    Ed25519,
    /// ECDSA over NIST P-256, used for the certificate authorities.
    EcdsaP256,
}

impl KeyAlgorithm {
    /// The fixed PEM block label for this algorithm.
    pub fn pem_label(self) -> &'static str {
        match self {
            KeyAlgorithm::Secp256k1 => SEC1_PEM_LABEL,
            KeyAlgorithm::Ed25519 | KeyAlgorithm::EcdsaP256 => PKCS8_PEM_LABEL,
        }
    }

    fn signature_algorithm(self) -> Option<&'static SignatureAlgorithm> {
        match self {
            KeyAlgorithm::Secp256k1 => None,
            KeyAlgorithm::Ed25519 => Some(&PKCS_ED25519),
            KeyAlgorithm::EcdsaP256 => Some(&PKCS_ECDSA_P256_SHA256),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::Secp256k1 => "secp256k1",
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::EcdsaP256 => "ecdsa-p256",
        };
        f.write_str(name)
    }
}

enum KeyMaterial {
    Secp256k1(k256::SecretKey),
    /// Keys usable for X.509 signing
    Certificate(KeyPair),
}

/// A private key of one of the [`KeyAlgorithm`]s.
pub struct PrivateKey {
    algorithm: KeyAlgorithm,
    material: KeyMaterial,
}

impl PrivateKey {
    /// Generate a fresh random key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyGeneration`] if the system random source or
    /// the algorithm implementation is unavailable.
    pub fn generate(algorithm: KeyAlgorithm) -> Result<Self, CryptoError> {
        let material = match algorithm.signature_algorithm() {
            None => KeyMaterial::Secp256k1(secp256k1::generate()),
            Some(alg) => KeyMaterial::Certificate(
                KeyPair::generate_for(alg)
                    .map_err(|e| CryptoError::KeyGeneration(format!("{algorithm}: {e}")))?,
            ),
        };
        Ok(Self {
            algorithm,
            material,
        })
    }

    /// Algorithm of this key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Public key bytes.
    ///
    /// Uncompressed SEC1 point (65 bytes) for the ECDSA algorithms, the raw
    /// 32-byte key for Ed25519.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match &self.material {
            KeyMaterial::Secp256k1(secret) => secp256k1::uncompressed_public_key(secret).to_vec(),
            KeyMaterial::Certificate(key_pair) => key_pair.public_key_raw().to_vec(),
        }
    }

    /// Encode as PEM with the algorithm's fixed label.
    pub fn to_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        match &self.material {
            KeyMaterial::Secp256k1(secret) => secp256k1::to_sec1_pem(secret),
            KeyMaterial::Certificate(key_pair) => Ok(Zeroizing::new(key_pair.serialize_pem())),
        }
    }

    /// Decode a PEM produced by [`PrivateKey::to_pem`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the block label does not match
    /// the algorithm, the payload is malformed, or the key belongs to a
    /// different algorithm.
    pub fn from_pem(algorithm: KeyAlgorithm, pem: &str) -> Result<Self, CryptoError> {
        let expected = format!("-----BEGIN {}-----", algorithm.pem_label());
        let first_line = pem.lines().map(str::trim).find(|l| !l.is_empty());
        if first_line != Some(expected.as_str()) {
            return Err(CryptoError::InvalidKey(format!(
                "expected PEM block {:?} for {algorithm} key",
                algorithm.pem_label()
            )));
        }

        let material = match algorithm.signature_algorithm() {
            None => KeyMaterial::Secp256k1(secp256k1::from_sec1_pem(pem)?),
            Some(alg) => {
                let key_pair = KeyPair::from_pem(pem)
                    .map_err(|e| CryptoError::InvalidKey(format!("{algorithm}: {e}")))?;
                if key_pair.algorithm() != alg {
                    return Err(CryptoError::InvalidKey(format!(
                        "PEM does not contain a {algorithm} key"
                    )));
                }
                KeyMaterial::Certificate(key_pair)
            }
        };

        Ok(Self {
            algorithm,
            material,
        })
    }

    /// Read and decode a PEM key file.
    pub fn load(algorithm: KeyAlgorithm, path: &Path) -> Result<Self, CryptoError> {
        let pem = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            CryptoError::Io {
                path: path.display().to_string(),
                source,
            }
        })?);
        Self::from_pem(algorithm, &pem)
    }

    /// The X.509 signing key pair, for the algorithms that have one.
    pub(crate) fn key_pair(&self) -> Result<&KeyPair, CryptoError> {
        match &self.material {
            KeyMaterial::Certificate(key_pair) => Ok(key_pair),
            KeyMaterial::Secp256k1(_) => Err(CryptoError::InvalidKey(format!(
                "{} keys cannot sign certificates",
                self.algorithm
            ))),
        }
    }

    pub(crate) fn secp256k1_secret(&self) -> Result<&k256::SecretKey, CryptoError> {
        match &self.material {
            KeyMaterial::Secp256k1(secret) => Ok(secret),
            KeyMaterial::Certificate(_) => Err(CryptoError::InvalidKey(format!(
                "expected a secp256k1 key, got {}",
                self.algorithm
            ))),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

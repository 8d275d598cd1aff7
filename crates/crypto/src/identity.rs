//! Node identity derivation
//!
//! A node has two public identities, both derived from its private keys:
//! - the chain address of the secp256k1 account key
//! - the libp2p peer ID of the Ed25519 network key
//!
//! The `*_file` variants read the key back from disk so that the identity
//! recorded in generated documents is the identity of the bytes actually
//! written.

use crate::ed25519::peer_id_from_public_key;
use crate::error::CryptoError;
use crate::keys::{KeyAlgorithm, PrivateKey};
use crate::secp256k1;
use libp2p_identity::PeerId;
use std::path::Path;

/// Chain address of a secp256k1 key, EIP-55 checksummed (`0x` + 40 hex).
pub fn address_from_key(key: &PrivateKey) -> Result<String, CryptoError> {
    secp256k1::checksum_address(key.secp256k1_secret()?)
}

/// Peer ID of an Ed25519 key.
pub fn peer_id_from_key(key: &PrivateKey) -> Result<PeerId, CryptoError> {
    if key.algorithm() != KeyAlgorithm::Ed25519 {
        return Err(CryptoError::InvalidKey(format!(
            "expected an ed25519 key, got {}",
            key.algorithm()
        )));
    }
    peer_id_from_public_key(&key.public_key_bytes())
}

/// Chain address of the secp256k1 key stored at `path`.
pub fn address_from_key_file(path: &Path) -> Result<String, CryptoError> {
    let key = PrivateKey::load(KeyAlgorithm::Secp256k1, path)?;
    address_from_key(&key)
}

/// Peer ID of the Ed25519 key stored at `path`.
pub fn peer_id_from_key_file(path: &Path) -> Result<PeerId, CryptoError> {
    let key = PrivateKey::load(KeyAlgorithm::Ed25519, path)?;
    peer_id_from_key(&key)
}

//! Ed25519 network identity
//!
//! The Ed25519 node key serves two roles:
//! - it is the subject key of the node's TLS certificate
//! - its libp2p peer ID identifies the node on the p2p network
//!
//! The peer ID is the libp2p identity multihash of the protobuf-encoded
//! public key, base58 encoded (`12D3KooW...`).

use crate::error::CryptoError;
use libp2p_identity::{ed25519, PeerId, PublicKey};

/// Length of a raw Ed25519 public key
pub const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Derive the libp2p peer ID of a raw Ed25519 public key.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKey`] if the bytes are not a valid
/// Ed25519 public key.
pub fn peer_id_from_public_key(public_key: &[u8]) -> Result<PeerId, CryptoError> {
    if public_key.len() != ED25519_PUBLIC_KEY_LEN {
        return Err(CryptoError::InvalidKey(format!(
            "expected {ED25519_PUBLIC_KEY_LEN}-byte ed25519 public key, got {} bytes",
            public_key.len()
        )));
    }
    let key = ed25519::PublicKey::try_from_bytes(public_key)
        .map_err(|e| CryptoError::InvalidKey(format!("ed25519 public key: {e}")))?;
    Ok(PublicKey::from(key).to_peer_id())
}

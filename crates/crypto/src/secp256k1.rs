//! Secp256k1 account keys
//!
//! Account keys sign chain transactions. The chain address of a node is the
//! EVM-style address of its account key:
//! keccak256(uncompressed_pubkey[1..])[12..], rendered with an EIP-55
//! checksum.
//!
//! Uses the k256 crate for secp256k1 curve operations.

use crate::error::CryptoError;
use alloy_primitives::{keccak256, Address};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::pkcs8::LineEnding;
use k256::SecretKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Generate a new random secret key
pub(crate) fn generate() -> SecretKey {
    SecretKey::random(&mut OsRng)
}

/// Uncompressed public key (65 bytes, with 0x04 prefix)
pub(crate) fn uncompressed_public_key(secret: &SecretKey) -> [u8; 65] {
    let encoded = secret.public_key().to_encoded_point(false);
    let bytes = encoded.as_bytes();
    let mut result = [0u8; 65];
    result.copy_from_slice(bytes);
    result
}

pub(crate) fn to_sec1_pem(secret: &SecretKey) -> Result<Zeroizing<String>, CryptoError> {
    secret
        .to_sec1_pem(LineEnding::LF)
        .map_err(|e| CryptoError::Encoding(format!("secp256k1 SEC1 PEM: {e}")))
}

pub(crate) fn from_sec1_pem(pem: &str) -> Result<SecretKey, CryptoError> {
    SecretKey::from_sec1_pem(pem)
        .map_err(|e| CryptoError::InvalidKey(format!("secp256k1 SEC1 PEM: {e}")))
}

/// Derive the chain address from an uncompressed public key.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKey`] unless `public_key` is a 65-byte
/// uncompressed point.
pub fn address_from_public_key(public_key: &[u8]) -> Result<Address, CryptoError> {
    if public_key.len() != 65 || public_key[0] != 0x04 {
        return Err(CryptoError::InvalidKey(format!(
            "expected 65-byte uncompressed secp256k1 public key, got {} bytes",
            public_key.len()
        )));
    }
    // Skip the 0x04 prefix byte
    let hash = keccak256(&public_key[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Address of a secret key, EIP-55 checksummed.
pub(crate) fn checksum_address(secret: &SecretKey) -> Result<String, CryptoError> {
    let address = address_from_public_key(&uncompressed_public_key(secret))?;
    Ok(address.to_checksum(None))
}

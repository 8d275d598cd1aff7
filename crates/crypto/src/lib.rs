//! Cryptographic primitives for bootstrapping a permnet cluster
//!
//! This crate provides:
//! - Key generation and PEM encoding for secp256k1, Ed25519 and P-256 keys
//! - Chain address derivation (secp256k1 account keys)
//! - libp2p peer ID derivation (Ed25519 network keys)
//! - A two-level certificate authority (root and agency) issuing node certificates
//! - Certificate chain validation

pub mod ca;
pub mod ed25519;
pub mod error;
pub mod identity;
pub mod keys;
pub mod secp256k1;
pub mod verify;

// Key exports
pub use keys::{KeyAlgorithm, PrivateKey, PKCS8_PEM_LABEL, SEC1_PEM_LABEL};

// Identity exports
pub use ed25519::peer_id_from_public_key;
pub use identity::{address_from_key, address_from_key_file, peer_id_from_key, peer_id_from_key_file};
pub use secp256k1::address_from_public_key;

// Certificate authority exports
pub use ca::{CaMaterial, CertSubject, LeafRequest, AGENCY_COMMON_NAME, ROOT_COMMON_NAME};
pub use verify::{inspect_certificate, verify_chain, verify_issued_by, CertificateInfo};

// Error exports
pub use error::CryptoError;

pub use libp2p_identity::PeerId;

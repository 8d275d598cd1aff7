//! Property-based tests for key encoding and identity derivation
//!
//! Uses proptest to verify that identities survive the PEM round trip that
//! every generated key goes through before it is used.

use permnet_crypto::{
    address_from_key, address_from_public_key, peer_id_from_key, KeyAlgorithm, PrivateKey,
};
use proptest::prelude::*;

fn algorithm() -> impl Strategy<Value = KeyAlgorithm> {
    prop_oneof![
        Just(KeyAlgorithm::Secp256k1),
        Just(KeyAlgorithm::Ed25519),
        Just(KeyAlgorithm::EcdsaP256),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: PEM reload preserves the public key
    #[test]
    fn prop_pem_reload_preserves_public_key(alg in algorithm()) {
        let key = PrivateKey::generate(alg).expect("generate key");
        let pem = key.to_pem().expect("encode key");

        let reloaded = PrivateKey::from_pem(alg, &pem).expect("decode key");
        prop_assert_eq!(key.public_key_bytes(), reloaded.public_key_bytes());
    }

    /// Property: Address derivation is stable across the PEM round trip
    #[test]
    fn prop_address_survives_reload(_seed in any::<u64>()) {
        let key = PrivateKey::generate(KeyAlgorithm::Secp256k1).expect("generate key");
        let pem = key.to_pem().expect("encode key");
        let reloaded = PrivateKey::from_pem(KeyAlgorithm::Secp256k1, &pem).expect("decode key");

        let address = address_from_key(&key).expect("address");
        prop_assert_eq!(&address, &address_from_key(&reloaded).expect("address"));

        // Checksum only changes letter case
        let raw = address_from_public_key(&key.public_key_bytes()).expect("raw address");
        prop_assert_eq!(address.to_lowercase(), format!("0x{}", hex::encode(raw.as_slice())));
    }

    /// Property: Peer ID derivation is stable across the PEM round trip
    #[test]
    fn prop_peer_id_survives_reload(_seed in any::<u64>()) {
        let key = PrivateKey::generate(KeyAlgorithm::Ed25519).expect("generate key");
        let pem = key.to_pem().expect("encode key");
        let reloaded = PrivateKey::from_pem(KeyAlgorithm::Ed25519, &pem).expect("decode key");

        prop_assert_eq!(
            peer_id_from_key(&key).expect("peer id"),
            peer_id_from_key(&reloaded).expect("peer id")
        );
    }

    /// Property: Malformed public keys are rejected, never panic
    #[test]
    fn prop_address_rejects_bad_lengths(bytes in prop::collection::vec(any::<u8>(), 0..100)) {
        prop_assume!(bytes.len() != 65);
        prop_assert!(address_from_public_key(&bytes).is_err());
    }
}

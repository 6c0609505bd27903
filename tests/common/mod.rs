//! Shared test fixtures: throwaway keys generated through the rpgp engine.

use pgp::composed::{
    KeyType, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey, SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::crypto::hash::HashAlgorithm;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::Password;
use rand::thread_rng;
use smallvec::smallvec;

pub const TEST_PASSPHRASE: &str = "correct horse battery staple";

/// Generate a Curve25519 key pair: signing-capable primary plus an
/// encryption subkey, both protected by `passphrase` (empty = unprotected).
pub fn generate_key(passphrase: &str, user_id: &str) -> (SignedSecretKey, SignedPublicKey) {
    let mut rng = thread_rng();

    let mut subkey = SubkeyParamsBuilder::default();
    subkey
        .key_type(KeyType::ECDH(ECCCurve::Curve25519))
        .can_encrypt(true);
    if !passphrase.is_empty() {
        subkey.passphrase(Some(passphrase.to_string()));
    }

    let mut params = SecretKeyParamsBuilder::default();
    params
        .key_type(KeyType::EdDSALegacy)
        .can_certify(true)
        .can_sign(true)
        .primary_user_id(user_id.to_string())
        .preferred_symmetric_algorithms(smallvec![SymmetricKeyAlgorithm::AES256])
        .preferred_hash_algorithms(smallvec![HashAlgorithm::Sha256])
        .preferred_compression_algorithms(smallvec![])
        .subkeys(vec![subkey.build().unwrap()]);
    if !passphrase.is_empty() {
        params.passphrase(Some(passphrase.to_string()));
    }

    let secret_key = params.build().unwrap().generate(&mut rng).unwrap();
    let signed_secret = secret_key
        .sign(&mut rng, &Password::from(passphrase))
        .unwrap();
    let public = SignedPublicKey::from(signed_secret.clone());

    (signed_secret, public)
}

//! Detached signature verification.

use std::io::Cursor;

use pgp::composed::{Deserializable, StandaloneSignature};

use crate::error::Result;
use crate::internal::check_signature_expiry;
use crate::keyring::PublicKeyRing;
use crate::types::VerificationTime;

/// Verify a detached signature (armored or binary) over `data`.
///
/// Every primary key and subkey of the verifier ring is tried; a signature
/// that verifies cryptographically but is expired at `verify_time` (after
/// the grace-window reclassification) counts as invalid.
pub fn verify_detached(
    verifier_keys: &PublicKeyRing,
    data: &[u8],
    signature: &[u8],
    verify_time: VerificationTime,
) -> Result<bool> {
    let signature = match StandaloneSignature::from_armor_single(Cursor::new(signature)) {
        Ok((parsed, _headers)) => parsed,
        Err(_) => match StandaloneSignature::from_bytes(Cursor::new(signature)) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(false),
        },
    };

    if check_signature_expiry(&signature.signature, verify_time).is_some() {
        return Ok(false);
    }

    for key in verifier_keys.keys() {
        if signature.verify(&key.primary_key, data).is_ok() {
            return Ok(true);
        }
        for subkey in &key.public_subkeys {
            if signature.verify(&subkey.key, data).is_ok() {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

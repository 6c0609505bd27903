//! Detached signing over raw bytes.

use pgp::composed::ArmorOptions;
use pgp::packet::SignatureType;
use pgp::types::Password;

use crate::error::{Error, Result};
use crate::internal::{detached_signature, parse_secret_key};
use crate::types::{Clock, SystemClock};

/// Create an armored detached signature over `data`.
///
/// The private key is supplied as armored (or binary) text and unlocked
/// with `passphrase`.
pub fn sign_detached(private_key: &str, passphrase: &[u8], data: &[u8]) -> Result<String> {
    sign_detached_with_clock(private_key, passphrase, data, &SystemClock)
}

/// [`sign_detached`] with an injected time source for the signature
/// creation timestamp.
pub fn sign_detached_with_clock(
    private_key: &str,
    passphrase: &[u8],
    data: &[u8],
    clock: &dyn Clock,
) -> Result<String> {
    let key = parse_secret_key(private_key.as_bytes())?;
    let password = Password::from(passphrase);
    key.unlock(&password, |_, _| Ok(()))
        .map_err(|_| Error::Unlock)?;

    let signature = detached_signature(
        SignatureType::Binary,
        &key,
        &password,
        data,
        clock.now(),
    )?;

    signature
        .to_armored_string(ArmorOptions::default())
        .map_err(|e| Error::Encode(e.to_string()))
}

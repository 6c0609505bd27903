//! Decryption and signature verification.
//!
//! Decryption success and verification outcome are deliberately independent:
//! [`decrypt_and_verify`] always returns the recovered plaintext when
//! decryption worked, and reports the signature state through
//! [`Verdict`]. It never aborts on a bad or unverifiable signature.

use log::{debug, warn};
use pgp::composed::{Deserializable, Message, SignedSecretKey};
use pgp::packet::Signature;
use pgp::types::Password;

use crate::error::{Error, Result};
use crate::internal::{check_signature_expiry, literal_to_string};
use crate::keyring::{PublicKeyRing, RingKey, SecretKeyRing, UnlockedKeyRing};
use crate::types::{DecryptedMessage, Verdict, VerificationTime};

/// Decrypt an armored message and classify its signature.
///
/// Every key in `decryption_keys` is unlocked with `passphrase`, tolerating
/// individual failures; if none unlocks, the call fails with
/// [`Error::NoDecryptionKey`]. The signature, if any, is looked up among
/// `verifier_keys` by the signer's key id and checked against the matched
/// key, subject to the expiration policy at `verify_time`.
///
/// # Example
///
/// ```ignore
/// // Ignored: illustrative example with placeholder key material
/// let keys = SecretKeyRing::from_armored(&armored_secret_key)?;
/// let verifier = PublicKeyRing::from_armored(&sender_public_key)?;
///
/// let result = decrypt_and_verify(
///     &ciphertext,
///     Some(&verifier),
///     &keys,
///     b"passphrase",
///     VerificationTime::now(),
/// )?;
///
/// assert_eq!(result.verdict, Verdict::Ok);
/// println!("{}", result.plaintext);
/// ```
pub fn decrypt_and_verify(
    ciphertext: &str,
    verifier_keys: Option<&PublicKeyRing>,
    decryption_keys: &SecretKeyRing,
    passphrase: impl AsRef<[u8]>,
    verify_time: VerificationTime,
) -> Result<DecryptedMessage> {
    let unlocked = decryption_keys
        .unlock(passphrase)
        .map_err(|_| Error::NoDecryptionKey)?;
    let message = decrypt_core(ciphertext, &unlocked)?;

    match &message {
        Message::Signed { signature, .. } => {
            let literal = message.get_literal().ok_or_else(|| {
                Error::MalformedMessage("signed message carries no literal data".to_string())
            })?;
            let plaintext = String::from_utf8(literal.data().to_vec())
                .map_err(|e| Error::MalformedMessage(e.to_string()))?;
            let (verdict, detail) =
                classify_signature(signature, literal.data(), verifier_keys, verify_time);
            Ok(DecryptedMessage {
                plaintext,
                verdict,
                detail,
            })
        }
        Message::Literal(_) => Ok(DecryptedMessage {
            plaintext: literal_to_string(&message)?,
            // Unsigned stays unsigned, even when verifier keys were supplied.
            verdict: Verdict::NotSigned,
            detail: None,
        }),
        _ => Err(Error::MalformedMessage(
            "unexpected message structure after decryption".to_string(),
        )),
    }
}

/// Decrypt an armored message without verifying signatures.
pub fn decrypt_message(
    ciphertext: &str,
    decryption_keys: &SecretKeyRing,
    passphrase: impl AsRef<[u8]>,
) -> Result<String> {
    let unlocked = decryption_keys
        .unlock(passphrase)
        .map_err(|_| Error::NoDecryptionKey)?;
    let message = decrypt_core(ciphertext, &unlocked)?;
    literal_to_string(&message)
}

/// Decrypt an armored, password-encrypted message.
pub fn decrypt_with_password(ciphertext: &str, password: impl AsRef<[u8]>) -> Result<String> {
    let (message, _headers) =
        Message::from_string(ciphertext).map_err(|e| Error::MalformedMessage(e.to_string()))?;
    let password = Password::from(password.as_ref());
    let decrypted = message
        .decrypt_with_password(&password)
        .map_err(|e| Error::MalformedMessage(e.to_string()))?;
    let decrypted = decrypted
        .decompress()
        .map_err(|e| Error::MalformedMessage(e.to_string()))?;
    literal_to_string(&decrypted)
}

/// Strip armor, decrypt against all usable keys, and remove one layer of
/// compression.
fn decrypt_core(ciphertext: &str, unlocked: &UnlockedKeyRing) -> Result<Message> {
    let (message, _headers) =
        Message::from_string(ciphertext).map_err(|e| Error::MalformedMessage(e.to_string()))?;

    let keys: Vec<&SignedSecretKey> = unlocked.keys().iter().collect();
    let passwords: Vec<Password> = keys.iter().map(|_| unlocked.password()).collect();

    debug!("decrypting against {} candidate keys", keys.len());
    let (decrypted, _recipients) = message.decrypt(&passwords, &keys).map_err(|e| match e {
        pgp::errors::Error::MissingKey => Error::NoDecryptionKey,
        other => Error::MalformedMessage(other.to_string()),
    })?;

    decrypted
        .decompress()
        .map_err(|e| Error::MalformedMessage(e.to_string()))
}

/// Classify an embedded signature against the verifier ring.
fn classify_signature(
    signature: &Signature,
    content: &[u8],
    verifier_keys: Option<&PublicKeyRing>,
    verify_time: VerificationTime,
) -> (Verdict, Option<String>) {
    let Some(verifier) = verifier_keys else {
        return (Verdict::NoVerifier, None);
    };

    let issuers = signature.issuer();
    if issuers.is_empty() {
        return (Verdict::NoVerifier, None);
    }

    let Some(matched) = issuers.iter().copied().find_map(|id| verifier.key_by_id(id)) else {
        warn!(
            "no verifier key matches signer {}",
            issuers
                .first()
                .map(|id| hex::encode_upper(id.as_ref()))
                .unwrap_or_default()
        );
        return (Verdict::NoVerifier, None);
    };

    let checked = match matched {
        RingKey::Primary(key) => signature.verify(key, content),
        RingKey::Subkey(key) => signature.verify(key, content),
    };

    match checked {
        Ok(()) => match check_signature_expiry(signature, verify_time) {
            None => (Verdict::Ok, None),
            Some(detail) => (Verdict::Failed, Some(detail)),
        },
        Err(e) => (Verdict::Failed, Some(e.to_string())),
    }
}

//! Encryption of inline messages.
//!
//! Two entry points: password-based symmetric encryption, and public-key
//! encryption with an optional embedded signature. Signer selection scans
//! the signing ring in insertion order and takes the first entity that is
//! signing-capable and unlocks, a deterministic tie-break rather than a "best
//! key" selection.

use pgp::composed::{ArmorOptions, Message};
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::{Password, StringToKey};
use rand::thread_rng;

use crate::error::{Error, Result};
use crate::internal::{sign_literal_message, trim_trailing_newlines};
use crate::keyring::{PublicKeyRing, SecretKeyRing};
use crate::types::{Clock, SystemClock};

/// Symmetrically encrypt a message with a password.
///
/// Produces an armored PGP message; no signing and no public key involved.
///
/// # Example
///
/// ```no_run
/// use mailseal::{encrypt_with_password, decrypt_with_password};
///
/// let armored = encrypt_with_password("attack at dawn", b"shared secret").unwrap();
/// let plaintext = decrypt_with_password(&armored, b"shared secret").unwrap();
/// assert_eq!(plaintext, "attack at dawn");
/// ```
pub fn encrypt_with_password(plaintext: &str, password: impl AsRef<[u8]>) -> Result<String> {
    let mut rng = thread_rng();
    let message = Message::new_literal("", plaintext);
    let s2k = StringToKey::new_default(&mut rng);
    let password = Password::from(password.as_ref());

    let encrypted = message
        .encrypt_with_password_seipdv1(&mut rng, s2k, SymmetricKeyAlgorithm::AES256, &password)
        .map_err(|e| Error::Encode(e.to_string()))?;

    encrypted
        .to_armored_string(ArmorOptions::default())
        .map_err(|e| Error::Encode(e.to_string()))
}

/// Encrypt a message to a public key ring, optionally signing it.
///
/// When both `signing_keys` and `passphrase` are supplied, the message is
/// one-pass signed by the first usable signer before encryption; if no key
/// in the signing ring qualifies, the call fails with
/// [`Error::SignerLocked`]; encryption never silently proceeds unsigned
/// when signing was requested. `trim_trailing` removes trailing newline
/// noise from the plaintext first.
pub fn encrypt_message(
    plaintext: &str,
    public_keys: &PublicKeyRing,
    signing_keys: Option<&SecretKeyRing>,
    passphrase: Option<&[u8]>,
    trim_trailing: bool,
) -> Result<String> {
    encrypt_message_with_clock(
        plaintext,
        public_keys,
        signing_keys,
        passphrase,
        trim_trailing,
        &SystemClock,
    )
}

/// [`encrypt_message`] with an injected time source for the signature
/// creation timestamp.
pub fn encrypt_message_with_clock(
    plaintext: &str,
    public_keys: &PublicKeyRing,
    signing_keys: Option<&SecretKeyRing>,
    passphrase: Option<&[u8]>,
    trim_trailing: bool,
    clock: &dyn Clock,
) -> Result<String> {
    let text = if trim_trailing {
        trim_trailing_newlines(plaintext)
    } else {
        plaintext
    };

    let mut rng = thread_rng();
    let mut message = Message::new_literal("", text);

    if let (Some(ring), Some(passphrase)) = (signing_keys, passphrase) {
        let signer = ring.first_signer(passphrase).ok_or(Error::SignerLocked)?;
        let password = Password::from(passphrase);
        message = sign_literal_message(message, signer, &password, clock.now())?;
    }

    let encryption_keys = public_keys.encryption_subkeys()?;
    let encrypted = message
        .encrypt_to_keys_seipdv1(&mut rng, SymmetricKeyAlgorithm::AES256, &encryption_keys)
        .map_err(|e| Error::Encode(e.to_string()))?;

    encrypted
        .to_armored_string(ArmorOptions::default())
        .map_err(|e| Error::Encode(e.to_string()))
}

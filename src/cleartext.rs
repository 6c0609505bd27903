//! Cleartext signature framing: human-readable signed text.
//!
//! The signed content is canonicalized by trimming trailing whitespace from
//! every line. Canonicalization runs identically on the sign and verify
//! paths; without that, verification would spuriously fail on content that
//! differs only in trailing whitespace after transport reformatting.

use chrono::SubsecRound;
use pgp::composed::{ArmorOptions, CleartextSignedMessage, StandaloneSignature};
use pgp::packet::{SignatureConfig, SignatureType, Subpacket, SubpacketData};
use pgp::types::{KeyDetails, KeyVersion, Password};

use crate::error::{Error, Result};
use crate::internal::{
    check_signature_expiry, parse_secret_key, select_hash_for_key, trim_each_line,
};
use crate::keyring::PublicKeyRing;
use crate::types::{Clock, SystemClock, VerificationTime};

/// Sign text as a cleartext message.
///
/// The private key is supplied as armored (or binary) text and unlocked
/// with `passphrase`. Each line of `text` is canonicalized before signing,
/// and the result is the full cleartext-signature framing.
pub fn sign_cleartext_message(private_key: &str, passphrase: &[u8], text: &str) -> Result<String> {
    sign_cleartext_message_with_clock(private_key, passphrase, text, &SystemClock)
}

/// [`sign_cleartext_message`] with an injected time source for the
/// signature creation timestamp.
pub fn sign_cleartext_message_with_clock(
    private_key: &str,
    passphrase: &[u8],
    text: &str,
    clock: &dyn Clock,
) -> Result<String> {
    let key = parse_secret_key(private_key.as_bytes())?;
    let password = Password::from(passphrase);
    key.unlock(&password, |_, _| Ok(()))
        .map_err(|_| Error::Unlock)?;

    let canonical = trim_each_line(text);

    let mut config = match key.version() {
        KeyVersion::V4 => SignatureConfig::v4(
            SignatureType::Text,
            key.algorithm(),
            select_hash_for_key(key.algorithm()),
        ),
        v => return Err(Error::Sign(format!("unsupported key version {:?}", v))),
    };
    config.hashed_subpackets = vec![
        Subpacket::regular(SubpacketData::IssuerFingerprint(key.fingerprint()))?,
        Subpacket::regular(SubpacketData::SignatureCreationTime(
            clock.now().trunc_subsecs(0),
        ))?,
    ];
    config.unhashed_subpackets = vec![Subpacket::regular(SubpacketData::Issuer(key.key_id()))?];

    let signed = CleartextSignedMessage::new_many(&canonical, move |signature_text| {
        let signature = config.sign(&key.primary_key, &password, signature_text)?;
        Ok(vec![signature])
    })
    .map_err(|e| Error::Sign(e.to_string()))?;

    signed
        .to_armored_string(ArmorOptions::default())
        .map_err(|e| Error::Encode(e.to_string()))
}

/// Verify a cleartext signed message against an armored public key and
/// return the canonical plaintext on success.
pub fn verify_cleartext_message(
    public_key: &str,
    message: &str,
    verify_time: VerificationTime,
) -> Result<String> {
    let ring = PublicKeyRing::from_bytes(public_key.as_bytes())?;
    verify_cleartext_message_with_ring(&ring, message, verify_time)
}

/// Verify a cleartext signed message against a verifier key ring.
///
/// The recovered text is re-canonicalized exactly as on the sign path and
/// returned with `\n` line endings. The signature is subject to the
/// expiration policy at `verify_time`.
pub fn verify_cleartext_message_with_ring(
    verifier_keys: &PublicKeyRing,
    message: &str,
    verify_time: VerificationTime,
) -> Result<String> {
    let (signed, _headers) =
        CleartextSignedMessage::from_string(message).map_err(|e| Error::Parse(e.to_string()))?;

    let mut verified: Option<&StandaloneSignature> = None;
    'keys: for key in verifier_keys.keys() {
        if let Ok(signature) = signed.verify(&key.primary_key) {
            verified = Some(signature);
            break;
        }
        for subkey in &key.public_subkeys {
            if let Ok(signature) = signed.verify(&subkey.key) {
                verified = Some(signature);
                break 'keys;
            }
        }
    }

    let signature =
        verified.ok_or_else(|| Error::Verification("no matching verifier key".to_string()))?;
    if let Some(detail) = check_signature_expiry(&signature.signature, verify_time) {
        return Err(Error::Verification(detail));
    }

    let text = signed.signed_text().replace("\r\n", "\n");
    Ok(trim_each_line(&text))
}

//! Internal helper functions.

use std::io::Cursor;

use chrono::{DateTime, SubsecRound, Utc};
use pgp::composed::{Deserializable, Message, SignedSecretKey, StandaloneSignature};
use pgp::crypto::hash::HashAlgorithm;
use pgp::crypto::public_key::PublicKeyAlgorithm;
use pgp::packet::{
    OnePassSignature, SignatureConfig, SignatureType, Subpacket, SubpacketData,
};
use pgp::types::{KeyDetails, KeyVersion, Password};

use crate::error::{Error, Result};

/// Parse a secret key from bytes (armored or binary).
pub(crate) fn parse_secret_key(data: &[u8]) -> Result<SignedSecretKey> {
    match SignedSecretKey::from_armor_single(Cursor::new(data)) {
        Ok((key, _headers)) => Ok(key),
        Err(_) => SignedSecretKey::from_bytes(Cursor::new(data))
            .map_err(|e| Error::Parse(e.to_string())),
    }
}

/// Read the literal body of a decrypted message as a UTF-8 string.
pub(crate) fn literal_to_string(message: &Message) -> Result<String> {
    let literal = message
        .get_literal()
        .ok_or_else(|| Error::MalformedMessage("message carries no literal data".to_string()))?;
    String::from_utf8(literal.data().to_vec()).map_err(|e| Error::MalformedMessage(e.to_string()))
}

/// Trim trailing newline noise from a message body.
pub(crate) fn trim_trailing_newlines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

/// Trim trailing spaces and tabs from every line, as required by the
/// cleartext-signature framing. Line endings are normalized to `\n`.
pub(crate) fn trim_each_line(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_end_matches(['\r', ' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hash algorithm for signatures made with the given key algorithm.
pub(crate) fn select_hash_for_key(algorithm: PublicKeyAlgorithm) -> HashAlgorithm {
    match algorithm {
        PublicKeyAlgorithm::RSA | PublicKeyAlgorithm::RSASign => HashAlgorithm::Sha256,
        PublicKeyAlgorithm::EdDSALegacy | PublicKeyAlgorithm::Ed25519 => HashAlgorithm::Sha256,
        PublicKeyAlgorithm::ECDSA => HashAlgorithm::Sha256,
        _ => HashAlgorithm::Sha256,
    }
}

/// A v4 signature configuration carrying the issuer fingerprint and key id,
/// with the creation time supplied by the caller's clock.
fn signature_config(
    typ: SignatureType,
    key: &SignedSecretKey,
    created: DateTime<Utc>,
) -> Result<SignatureConfig> {
    let mut config = match key.version() {
        KeyVersion::V4 => {
            SignatureConfig::v4(typ, key.algorithm(), select_hash_for_key(key.algorithm()))
        }
        v => return Err(Error::Sign(format!("unsupported key version {:?}", v))),
    };
    config.hashed_subpackets = vec![
        Subpacket::regular(SubpacketData::IssuerFingerprint(key.fingerprint()))?,
        Subpacket::regular(SubpacketData::SignatureCreationTime(
            created.trunc_subsecs(0),
        ))?,
    ];
    config.unhashed_subpackets = vec![Subpacket::regular(SubpacketData::Issuer(key.key_id()))?];
    Ok(config)
}

/// Create a detached signature over `data` with the primary key.
pub(crate) fn detached_signature(
    typ: SignatureType,
    key: &SignedSecretKey,
    key_pw: &Password,
    data: &[u8],
    created: DateTime<Utc>,
) -> Result<StandaloneSignature> {
    let config = signature_config(typ, key, created)?;
    let signature = config
        .sign(&key.primary_key, key_pw, data)
        .map_err(|e| Error::Sign(e.to_string()))?;
    Ok(StandaloneSignature::new(signature))
}

/// One-pass sign a literal message, nesting it in the signature framing.
pub(crate) fn sign_literal_message(
    message: Message,
    key: &SignedSecretKey,
    key_pw: &Password,
    created: DateTime<Utc>,
) -> Result<Message> {
    let Message::Literal(ref literal) = message else {
        return Err(Error::Sign("only literal messages can be signed".to_string()));
    };

    let typ = if literal.is_binary() {
        SignatureType::Binary
    } else {
        SignatureType::Text
    };
    let config = signature_config(typ, key, created)?;
    let signature = config
        .sign(&key.primary_key, key_pw, literal.data())
        .map_err(|e| Error::Sign(e.to_string()))?;

    let ops = OnePassSignature::v3(
        typ,
        select_hash_for_key(key.algorithm()),
        key.algorithm(),
        key.key_id(),
    );

    Ok(Message::Signed {
        message: Some(Box::new(message)),
        one_pass_signature: Some(ops),
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_newlines() {
        assert_eq!(trim_trailing_newlines("hello\n\n"), "hello");
        assert_eq!(trim_trailing_newlines("hello\r\n"), "hello");
        assert_eq!(trim_trailing_newlines("hello"), "hello");
        assert_eq!(trim_trailing_newlines("hello\nworld\n"), "hello\nworld");
        assert_eq!(trim_trailing_newlines(""), "");
    }

    #[test]
    fn test_trim_each_line() {
        assert_eq!(trim_each_line("hello  \nworld\t"), "hello\nworld");
        assert_eq!(trim_each_line("a\r\nb"), "a\nb");
        assert_eq!(trim_each_line("no trailing"), "no trailing");
        assert_eq!(trim_each_line("  leading kept"), "  leading kept");
    }
}

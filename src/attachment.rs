//! Attachment split-encryption.
//!
//! Encrypts a file-tagged payload and returns the session-key packet, the
//! bulk data packet, and a detached signature as three independent binary
//! blobs, for transports that store key material and payload separately.
//! Concatenating the key packet and the data packet yields a regular
//! encrypted OpenPGP message.

use bytes::Bytes;
use pgp::composed::Message;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::packet::{LiteralData, SignatureType};
use pgp::ser::Serialize;
use pgp::types::Password;
use rand::thread_rng;

use crate::error::{Error, Result};
use crate::internal::{detached_signature, parse_secret_key};
use crate::keyring::PublicKeyRing;
use crate::types::{Clock, EncryptedAttachment, SystemClock};

/// Encrypt `data` to `public_keys` and sign it with the given private key.
///
/// The private key is supplied as armored (or binary) text and unlocked
/// with `passphrase`. The plaintext is tagged with `filename`. Failure at
/// any stage aborts the whole operation; no partial output is returned.
pub fn encrypt_sign_attachment(
    public_keys: &PublicKeyRing,
    private_key: &str,
    passphrase: &[u8],
    filename: &str,
    data: &[u8],
) -> Result<EncryptedAttachment> {
    encrypt_sign_attachment_with_clock(
        public_keys,
        private_key,
        passphrase,
        filename,
        data,
        &SystemClock,
    )
}

/// [`encrypt_sign_attachment`] with an injected time source for the
/// signature creation timestamp.
pub fn encrypt_sign_attachment_with_clock(
    public_keys: &PublicKeyRing,
    private_key: &str,
    passphrase: &[u8],
    filename: &str,
    data: &[u8],
    clock: &dyn Clock,
) -> Result<EncryptedAttachment> {
    let signer = parse_secret_key(private_key.as_bytes())?;
    let password = Password::from(passphrase);
    signer
        .unlock(&password, |_, _| Ok(()))
        .map_err(|_| Error::Unlock)?;

    let mut rng = thread_rng();
    let literal = LiteralData::from_bytes(
        Bytes::from(filename.to_string()),
        Bytes::from(data.to_vec()),
    );
    let message = Message::Literal(literal);

    let encryption_keys = public_keys.encryption_subkeys()?;
    let encrypted = message
        .encrypt_to_keys_seipdv1(&mut rng, SymmetricKeyAlgorithm::AES256, &encryption_keys)
        .map_err(|e| Error::Encode(e.to_string()))?;

    let Message::Encrypted { esk, edata } = encrypted else {
        return Err(Error::Encode(
            "encryption produced an unexpected message structure".to_string(),
        ));
    };

    let mut key_packet = Vec::new();
    for packet in &esk {
        packet
            .to_writer(&mut key_packet)
            .map_err(|e| Error::Encode(e.to_string()))?;
    }
    let data_packet = edata.to_bytes().map_err(|e| Error::Encode(e.to_string()))?;

    let signature = detached_signature(
        SignatureType::Binary,
        &signer,
        &password,
        data,
        clock.now(),
    )?;
    let signature = signature
        .to_bytes()
        .map_err(|e| Error::Sign(e.to_string()))?;

    Ok(EncryptedAttachment {
        key_packet,
        data_packet,
        signature,
    })
}

//! Key rings: ordered collections of public or private key entities.
//!
//! A [`SecretKeyRing`] holds locked private keys; [`SecretKeyRing::unlock`]
//! validates a passphrase against every entity and produces an
//! [`UnlockedKeyRing`], a scoped value whose passphrase buffer is wiped on
//! drop. The locked ring itself is never mutated.

use std::io::Cursor;

use log::warn;
use pgp::composed::{Deserializable, SignedPublicKey, SignedPublicSubKey, SignedSecretKey};
use pgp::packet::{PublicKey, PublicSubkey};
use pgp::types::{KeyDetails, KeyId, Password};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::internal::is_subkey_valid;

/// An ordered collection of public key entities.
///
/// Insertion order is preserved; operations that scan the ring use it as a
/// deterministic tie-break.
#[derive(Debug, Clone, Default)]
pub struct PublicKeyRing {
    keys: Vec<SignedPublicKey>,
}

/// A key entity inside a [`PublicKeyRing`] matched by key id.
#[derive(Debug)]
pub enum RingKey<'a> {
    Primary(&'a PublicKey),
    Subkey(&'a PublicSubkey),
}

impl PublicKeyRing {
    /// Create a ring from already-parsed keys.
    pub fn from_keys(keys: Vec<SignedPublicKey>) -> Self {
        Self { keys }
    }

    /// Parse a ring from ASCII-armored key material.
    ///
    /// The input may contain multiple certificates.
    pub fn from_armored(input: &str) -> Result<Self> {
        let (iter, _headers) =
            SignedPublicKey::from_string_many(input).map_err(|e| Error::Parse(e.to_string()))?;
        Self::collect(iter)
    }

    /// Parse a ring from armored or binary key material.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.starts_with(b"-----BEGIN PGP") {
            let (iter, _headers) = SignedPublicKey::from_armor_many(Cursor::new(data))
                .map_err(|e| Error::Parse(e.to_string()))?;
            Self::collect(iter)
        } else {
            let iter = SignedPublicKey::from_bytes_many(Cursor::new(data))
                .map_err(|e| Error::Parse(e.to_string()))?;
            Self::collect(iter)
        }
    }

    fn collect<'a>(
        iter: Box<dyn Iterator<Item = pgp::errors::Result<SignedPublicKey>> + 'a>,
    ) -> Result<Self> {
        let keys = iter
            .collect::<pgp::errors::Result<Vec<_>>>()
            .map_err(|e| Error::Parse(e.to_string()))?;
        if keys.is_empty() {
            return Err(Error::Parse("no public keys found".to_string()));
        }
        Ok(Self { keys })
    }

    /// Append a key entity to the end of the ring.
    pub fn push(&mut self, key: SignedPublicKey) {
        self.keys.push(key);
    }

    /// The key entities, in insertion order.
    pub fn keys(&self) -> &[SignedPublicKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Look up a key entity by key id, checking primary keys and subkeys.
    pub fn key_by_id(&self, id: &KeyId) -> Option<RingKey<'_>> {
        for key in &self.keys {
            if key.primary_key.key_id() == *id {
                return Some(RingKey::Primary(&key.primary_key));
            }
            for subkey in &key.public_subkeys {
                if subkey.key.key_id() == *id {
                    return Some(RingKey::Subkey(&subkey.key));
                }
            }
        }
        None
    }

    /// All valid encryption subkeys across the ring, in ring order.
    ///
    /// A subkey qualifies when its algorithm supports encryption, a binding
    /// signature carries an encryption key flag, and it is neither revoked
    /// nor expired.
    pub(crate) fn encryption_subkeys(&self) -> Result<Vec<&SignedPublicSubKey>> {
        let mut out = Vec::new();
        for key in &self.keys {
            let before = out.len();
            for subkey in &key.public_subkeys {
                let has_encryption_flag = subkey.signatures.iter().any(|sig| {
                    let flags = sig.key_flags();
                    flags.encrypt_comms() || flags.encrypt_storage()
                });
                if !has_encryption_flag {
                    continue;
                }
                if !is_subkey_valid(subkey) {
                    continue;
                }
                out.push(subkey);
            }
            if out.len() == before {
                return Err(Error::NoEncryptionSubkey);
            }
        }
        if out.is_empty() {
            return Err(Error::NoEncryptionSubkey);
        }
        Ok(out)
    }
}

/// An ordered collection of locked private key entities.
#[derive(Debug, Clone, Default)]
pub struct SecretKeyRing {
    keys: Vec<SignedSecretKey>,
}

impl SecretKeyRing {
    /// Create a ring from already-parsed keys.
    pub fn from_keys(keys: Vec<SignedSecretKey>) -> Self {
        Self { keys }
    }

    /// Parse a ring from ASCII-armored key material.
    pub fn from_armored(input: &str) -> Result<Self> {
        let (iter, _headers) =
            SignedSecretKey::from_string_many(input).map_err(|e| Error::Parse(e.to_string()))?;
        Self::collect(iter)
    }

    /// Parse a ring from armored or binary key material.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.starts_with(b"-----BEGIN PGP") {
            let (iter, _headers) = SignedSecretKey::from_armor_many(Cursor::new(data))
                .map_err(|e| Error::Parse(e.to_string()))?;
            Self::collect(iter)
        } else {
            let iter = SignedSecretKey::from_bytes_many(Cursor::new(data))
                .map_err(|e| Error::Parse(e.to_string()))?;
            Self::collect(iter)
        }
    }

    fn collect<'a>(
        iter: Box<dyn Iterator<Item = pgp::errors::Result<SignedSecretKey>> + 'a>,
    ) -> Result<Self> {
        let keys = iter
            .collect::<pgp::errors::Result<Vec<_>>>()
            .map_err(|e| Error::Parse(e.to_string()))?;
        if keys.is_empty() {
            return Err(Error::Parse("no secret keys found".to_string()));
        }
        Ok(Self { keys })
    }

    /// Append a key entity to the end of the ring.
    pub fn push(&mut self, key: SignedSecretKey) {
        self.keys.push(key);
    }

    /// The key entities, in insertion order.
    pub fn keys(&self) -> &[SignedSecretKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validate `passphrase` against every entity in the ring and return the
    /// usable ones as an [`UnlockedKeyRing`].
    ///
    /// An entity is usable only when its primary key and all of its subkeys
    /// decrypt with the passphrase; an entity whose material is not
    /// encrypted unlocks with any passphrase, including an empty one.
    /// Entities that fail are skipped with a warning, since a multi-key ring may
    /// contain candidates for several different passphrases. Fails with
    /// [`Error::Unlock`] only when nothing unlocked.
    pub fn unlock(&self, passphrase: impl AsRef<[u8]>) -> Result<UnlockedKeyRing> {
        let passphrase = Zeroizing::new(passphrase.as_ref().to_vec());
        let password = Password::from(&passphrase[..]);

        let mut usable = Vec::new();
        for key in &self.keys {
            if entity_unlocks(key, &password) {
                usable.push(key.clone());
            } else {
                warn!(
                    "key {} does not unlock with the supplied passphrase",
                    hex::encode_upper(key.key_id().as_ref())
                );
            }
        }

        if usable.is_empty() {
            return Err(Error::Unlock);
        }
        Ok(UnlockedKeyRing {
            keys: usable,
            passphrase,
        })
    }

    /// First entity, in insertion order, that is signing-capable and unlocks
    /// with `passphrase`.
    pub(crate) fn first_signer(&self, passphrase: &[u8]) -> Option<&SignedSecretKey> {
        let password = Password::from(passphrase);
        self.keys
            .iter()
            .find(|key| can_sign(key) && key.unlock(&password, |_, _| Ok(())).is_ok())
    }
}

/// Private keys whose passphrase has been validated, scoped to one operation.
///
/// The passphrase is held in a zeroizing buffer and wiped when this value is
/// dropped; the key material itself stays encrypted at rest and is decrypted
/// transiently by the engine at each use.
#[derive(Debug)]
pub struct UnlockedKeyRing {
    keys: Vec<SignedSecretKey>,
    passphrase: Zeroizing<Vec<u8>>,
}

impl UnlockedKeyRing {
    /// The usable key entities, in insertion order.
    pub fn keys(&self) -> &[SignedSecretKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A fresh engine password for the validated passphrase.
    pub(crate) fn password(&self) -> Password {
        Password::from(&self.passphrase[..])
    }
}

/// Check that the primary key and every subkey decrypt with `password`.
///
/// Unencrypted material passes trivially; a single locked component makes
/// the whole entity unusable rather than silently skipping it.
fn entity_unlocks(key: &SignedSecretKey, password: &Password) -> bool {
    if key.unlock(password, |_, _| Ok(())).is_err() {
        return false;
    }
    key.secret_subkeys
        .iter()
        .all(|subkey| subkey.unlock(password, |_, _| Ok(())).is_ok())
}

/// Signing capability, read from the key flags of the user binding
/// signatures.
fn can_sign(key: &SignedSecretKey) -> bool {
    key.details
        .users
        .iter()
        .any(|user| user.signatures.iter().any(|sig| sig.key_flags().sign()))
}

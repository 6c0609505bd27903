//! Error types for the mailseal library.

use thiserror::Error;

/// The main error type for mailseal operations.
///
/// Verification *outcomes* of the decrypt pipeline are not errors: a message
/// that decrypts but carries a bad or unverifiable signature is reported
/// through [`Verdict`](crate::Verdict), alongside the recovered plaintext.
#[derive(Error, Debug)]
pub enum Error {
    /// Key or signature material could not be parsed
    #[error("parsing failed: {0}")]
    Parse(String),

    /// Wrong passphrase, or corrupt private key material
    #[error("invalid passphrase or locked key material")]
    Unlock,

    /// None of the supplied private keys can decrypt the message
    #[error("no usable decryption key for this message")]
    NoDecryptionKey,

    /// Signing was requested but no signer key could be unlocked
    #[error("cannot sign message, signer key is not unlocked")]
    SignerLocked,

    /// A recipient certificate carries no usable encryption subkey
    #[error("no suitable encryption subkey found")]
    NoEncryptionSubkey,

    /// Ciphertext is structurally invalid
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Producing the encrypted or armored output failed
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Producing a signature failed
    #[error("signing failed: {0}")]
    Sign(String),

    /// Cleartext or detached signature verification failed
    #[error("signature verification failed: {0}")]
    Verification(String),

    /// rpgp OpenPGP error
    #[error("OpenPGP error: {0}")]
    OpenPgp(#[from] pgp::errors::Error),
}

/// A specialized Result type for mailseal operations.
pub type Result<T> = std::result::Result<T, Error>;

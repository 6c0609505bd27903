//! # mailseal
//!
//! The message-processing core of an OpenPGP toolkit, built on
//! [rpgp](https://docs.rs/pgp): decryption, signature verification,
//! encryption, and detached-signature generation for both inline text and
//! binary attachments.
//!
//! The library orchestrates; the packet codec, armor framing, and cipher
//! primitives are delegated to rpgp.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailseal::{encrypt_with_password, decrypt_with_password};
//!
//! // Password-based (symmetric) encryption
//! let armored = encrypt_with_password("Hello!", b"secret").unwrap();
//! let plaintext = decrypt_with_password(&armored, b"secret").unwrap();
//! assert_eq!(plaintext, "Hello!");
//! ```
//!
//! ## Verification verdicts
//!
//! Decryption success and signature verification are independent outcomes.
//! [`decrypt_and_verify`] always returns the recovered plaintext when
//! decryption worked and reports the signature state through [`Verdict`]:
//! `Ok`, `Failed`, `NoVerifier`, or `NotSigned`. Callers must inspect the
//! verdict; the absence of an error does not mean the message was verified.
//!
//! ## Key rings
//!
//! Operations take ordered key rings. A [`SecretKeyRing`] is unlocked with a
//! passphrase into a scoped [`UnlockedKeyRing`]; a ring may hold several
//! candidate keys, and only one needs to unlock and match the message.
//! Signer selection for encryption scans the ring in insertion order and
//! takes the first usable key.
//!
//! ## Signature expiration
//!
//! Time-based signature checks run against an explicit
//! [`VerificationTime`] (either `Disabled` or a Unix instant) with a
//! grace window compensating signer/verifier clock skew.

// Modules
mod error;
mod internal;
mod types;

mod attachment;
mod cleartext;
mod decrypt;
mod encrypt;
mod keyring;
mod sign;
mod verify;

// Re-export error types
pub use error::{Error, Result};

// Re-export all public types
pub use types::{
    Clock,
    DecryptedMessage,
    EncryptedAttachment,
    FixedClock,
    SystemClock,
    Verdict,
    VerificationTime,
};

// Re-export key ring types
pub use keyring::{PublicKeyRing, RingKey, SecretKeyRing, UnlockedKeyRing};

// Re-export decryption functions
pub use decrypt::{decrypt_and_verify, decrypt_message, decrypt_with_password};

// Re-export encryption functions
pub use encrypt::{encrypt_message, encrypt_message_with_clock, encrypt_with_password};

// Re-export attachment functions
pub use attachment::{encrypt_sign_attachment, encrypt_sign_attachment_with_clock};

// Re-export cleartext signature functions
pub use cleartext::{
    sign_cleartext_message, sign_cleartext_message_with_clock, verify_cleartext_message,
    verify_cleartext_message_with_ring,
};

// Re-export detached signature functions
pub use sign::{sign_detached, sign_detached_with_clock};
pub use verify::verify_detached;

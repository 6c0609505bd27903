//! Public types shared across the library.

use chrono::{DateTime, Utc};

/// The classified outcome of signature verification.
///
/// Exactly one verdict applies per decrypted message. The verdict is
/// independent of decryption success: a message can decrypt fine and still
/// fail verification, and callers must inspect it explicitly: "no error
/// returned" does not mean "verified".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Signed by a known verifier key and cryptographically valid.
    Ok,
    /// Signed, but the signature is invalid (or expired outside the allowed
    /// window).
    Failed,
    /// The message is signed, but no verifier ring was supplied or the
    /// signer's key id is not in it.
    NoVerifier,
    /// The message carries no signature at all.
    NotSigned,
}

/// Result of a decrypt-and-verify call.
#[derive(Debug, Clone)]
pub struct DecryptedMessage {
    /// The recovered plaintext.
    pub plaintext: String,
    /// Signature verification outcome.
    pub verdict: Verdict,
    /// Human-readable detail when `verdict` is [`Verdict::Failed`].
    pub detail: Option<String>,
}

/// The instant against which signature validity is checked.
///
/// `Disabled` skips all time-based checks. The original interface overloaded
/// a zero timestamp for this; [`VerificationTime::from_unix`] keeps that
/// behavior for callers holding a raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationTime {
    /// No time check requested; an expired signature is treated as valid.
    Disabled,
    /// Check against this Unix timestamp (seconds).
    At(i64),
}

impl VerificationTime {
    /// Map a raw Unix timestamp to a verification time, treating zero (and
    /// anything negative) as "no check requested".
    pub fn from_unix(secs: i64) -> Self {
        if secs > 0 {
            VerificationTime::At(secs)
        } else {
            VerificationTime::Disabled
        }
    }

    /// The current wall-clock instant.
    pub fn now() -> Self {
        VerificationTime::At(Utc::now().timestamp())
    }
}

/// Output of attachment split-encryption.
///
/// All three blobs are unarmored binary; armoring, if needed, is the
/// caller's responsibility. The key packet and data packet are independently
/// transportable, and concatenating them yields a regular encrypted message.
#[derive(Debug, Clone)]
pub struct EncryptedAttachment {
    /// The encrypted session key packet(s), one per recipient key.
    pub key_packet: Vec<u8>,
    /// The bulk encrypted data packet.
    pub data_packet: Vec<u8>,
    /// Detached binary signature over the plaintext.
    pub signature: Vec<u8>,
}

/// A pluggable time source for signature creation timestamps.
///
/// Production code uses [`SystemClock`]; tests inject a [`FixedClock`] for
/// deterministic output.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

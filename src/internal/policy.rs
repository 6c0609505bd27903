//! Signature-expiration policy.
//!
//! The engine performs no time-based checks when verifying a signature, so
//! the expired condition is computed here from the signature's creation-time
//! and key-lifetime subpackets, then passed through a reclassification step
//! that grants a grace window for signer/verifier clock skew. The policy only
//! ever clears the expired condition; cryptographic failures are untouched.

use chrono::Utc;
use pgp::composed::SignedPublicSubKey;
use pgp::packet::{Signature, SignatureType};

use crate::types::VerificationTime;

/// Allowed clock skew between signer and verifier, in seconds (two days).
pub(crate) const CREATION_TIME_OFFSET: i64 = 60 * 60 * 24 * 2;

/// Strict expiry check: a signature is expired at `at` when the instant lies
/// before its creation time, or past `created + lifetime` for a declared
/// nonzero lifetime.
pub(crate) fn signature_expired(created: i64, key_lifetime_secs: Option<u64>, at: i64) -> bool {
    if at < created {
        return true;
    }
    match key_lifetime_secs {
        Some(lifetime) if lifetime > 0 => at > created.saturating_add(lifetime as i64),
        _ => false,
    }
}

/// Reclassify an expired result: the condition is cleared when no time check
/// was requested, or when the instant falls within
/// `[created - CREATION_TIME_OFFSET, created + lifetime]` (unbounded above
/// without a declared nonzero lifetime).
pub(crate) fn reclassify_expired(
    expired: bool,
    created: i64,
    key_lifetime_secs: Option<u64>,
    verify_time: VerificationTime,
) -> bool {
    if !expired {
        return false;
    }
    match verify_time {
        VerificationTime::Disabled => false,
        VerificationTime::At(at) => {
            let start = created - CREATION_TIME_OFFSET;
            let end = match key_lifetime_secs {
                Some(lifetime) if lifetime > 0 => created.saturating_add(lifetime as i64),
                _ => i64::MAX,
            };
            !(start <= at && at <= end)
        }
    }
}

/// Apply the full policy to a cryptographically valid signature.
///
/// Returns a failure description when the signature is expired at
/// `verify_time` even after the grace-window reclassification, `None`
/// otherwise. Signatures without a creation-time subpacket are not checked.
pub(crate) fn check_signature_expiry(
    signature: &Signature,
    verify_time: VerificationTime,
) -> Option<String> {
    let created = signature.created()?.timestamp();
    let lifetime = signature
        .key_expiration_time()
        .map(|d| std::time::Duration::from(*d).as_secs());

    let expired = match verify_time {
        VerificationTime::At(at) => signature_expired(created, lifetime, at),
        VerificationTime::Disabled => false,
    };

    if reclassify_expired(expired, created, lifetime, verify_time) {
        Some("signature expired".to_string())
    } else {
        None
    }
}

/// A subkey is usable when it is not revoked and the key expiration on its
/// most recent binding signature has not passed.
pub(crate) fn is_subkey_valid(subkey: &SignedPublicSubKey) -> bool {
    let revoked = subkey
        .signatures
        .iter()
        .any(|sig| sig.typ() == SignatureType::SubkeyRevocation);
    if revoked {
        return false;
    }

    if let Some(sig) = subkey.signatures.last() {
        if let Some(validity) = sig.key_expiration_time() {
            let lifetime = std::time::Duration::from(*validity).as_secs() as i64;
            if lifetime > 0 {
                let expires = subkey.key.created_at().timestamp() + lifetime;
                if expires < Utc::now().timestamp() {
                    return false;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATED: i64 = 1_600_000_000;
    const LIFETIME: u64 = 3600;

    #[test]
    fn test_valid_at_creation_time() {
        let expired = signature_expired(CREATED, Some(LIFETIME), CREATED);
        assert!(!expired);
        assert!(!reclassify_expired(
            expired,
            CREATED,
            Some(LIFETIME),
            VerificationTime::At(CREATED)
        ));
    }

    #[test]
    fn test_disabled_clears_expired() {
        let at = CREATED + LIFETIME as i64 + 999_999;
        let expired = signature_expired(CREATED, Some(LIFETIME), at);
        assert!(expired);
        assert!(!reclassify_expired(
            expired,
            CREATED,
            Some(LIFETIME),
            VerificationTime::Disabled
        ));
    }

    #[test]
    fn test_expired_past_lifetime() {
        let at = CREATED + LIFETIME as i64 + 1;
        let expired = signature_expired(CREATED, Some(LIFETIME), at);
        assert!(expired);
        assert!(reclassify_expired(
            expired,
            CREATED,
            Some(LIFETIME),
            VerificationTime::At(at)
        ));
    }

    #[test]
    fn test_grace_window_before_creation() {
        // Slightly before the creation time: strictly expired, but the
        // reclassification clears it within the skew allowance.
        let at = CREATED - CREATION_TIME_OFFSET / 2;
        let expired = signature_expired(CREATED, Some(LIFETIME), at);
        assert!(expired);
        assert!(!reclassify_expired(
            expired,
            CREATED,
            Some(LIFETIME),
            VerificationTime::At(at)
        ));
    }

    #[test]
    fn test_expired_far_before_creation() {
        let at = CREATED - CREATION_TIME_OFFSET - 1;
        let expired = signature_expired(CREATED, Some(LIFETIME), at);
        assert!(expired);
        assert!(reclassify_expired(
            expired,
            CREATED,
            Some(LIFETIME),
            VerificationTime::At(at)
        ));
    }

    #[test]
    fn test_no_lifetime_is_unbounded() {
        let at = CREATED + 100_000_000;
        assert!(!signature_expired(CREATED, None, at));
        assert!(!signature_expired(CREATED, Some(0), at));
    }

    #[test]
    fn test_reclassify_never_sets() {
        // A non-expired result stays non-expired regardless of the instant.
        assert!(!reclassify_expired(
            false,
            CREATED,
            Some(LIFETIME),
            VerificationTime::At(CREATED - 999_999_999)
        ));
    }
}

//! Integration tests for the encrypt and decrypt-verify pipelines.

mod common;

use common::{generate_key, TEST_PASSPHRASE};
use mailseal::{
    decrypt_and_verify, decrypt_message, decrypt_with_password, encrypt_message,
    encrypt_message_with_clock, encrypt_with_password, Error, FixedClock, PublicKeyRing,
    SecretKeyRing, Verdict, VerificationTime,
};

const PLAINTEXT: &str = "the quick brown fox jumps over the lazy dog";

mod password {
    use super::*;

    #[test]
    fn test_round_trip() {
        let armored = encrypt_with_password(PLAINTEXT, b"swordfish").unwrap();
        assert!(armored.starts_with("-----BEGIN PGP MESSAGE-----"));

        let decrypted = decrypt_with_password(&armored, b"swordfish").unwrap();
        assert_eq!(decrypted, PLAINTEXT);
    }

    #[test]
    fn test_garbage_input_is_malformed() {
        let err = decrypt_with_password("not an armored message", b"pw").unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(_)));
    }
}

mod key_based {
    use super::*;

    #[test]
    fn test_unsigned_round_trip() {
        let (secret, public) = generate_key(TEST_PASSPHRASE, "Alice <alice@example.com>");
        let recipients = PublicKeyRing::from_keys(vec![public]);

        let armored = encrypt_message(PLAINTEXT, &recipients, None, None, false).unwrap();

        let ring = SecretKeyRing::from_keys(vec![secret]);
        let decrypted = decrypt_message(&armored, &ring, TEST_PASSPHRASE).unwrap();
        assert_eq!(decrypted, PLAINTEXT);
    }

    #[test]
    fn test_unsigned_verdict_is_not_signed_even_with_verifier() {
        let (secret, public) = generate_key(TEST_PASSPHRASE, "Alice <alice@example.com>");
        let recipients = PublicKeyRing::from_keys(vec![public.clone()]);
        let verifier = PublicKeyRing::from_keys(vec![public]);

        let armored = encrypt_message(PLAINTEXT, &recipients, None, None, false).unwrap();

        let ring = SecretKeyRing::from_keys(vec![secret]);
        let result = decrypt_and_verify(
            &armored,
            Some(&verifier),
            &ring,
            TEST_PASSPHRASE,
            VerificationTime::now(),
        )
        .unwrap();

        assert_eq!(result.verdict, Verdict::NotSigned);
        assert_eq!(result.plaintext, PLAINTEXT);
    }

    #[test]
    fn test_trim_trailing_newlines() {
        let (secret, public) = generate_key(TEST_PASSPHRASE, "Alice <alice@example.com>");
        let recipients = PublicKeyRing::from_keys(vec![public]);

        let armored =
            encrypt_message("hello world\n\n\n", &recipients, None, None, true).unwrap();

        let ring = SecretKeyRing::from_keys(vec![secret]);
        let decrypted = decrypt_message(&armored, &ring, TEST_PASSPHRASE).unwrap();
        assert_eq!(decrypted, "hello world");
    }

    #[test]
    fn test_wrong_passphrase_is_no_decryption_key() {
        let (secret, public) = generate_key(TEST_PASSPHRASE, "Alice <alice@example.com>");
        let recipients = PublicKeyRing::from_keys(vec![public]);

        let armored = encrypt_message(PLAINTEXT, &recipients, None, None, false).unwrap();

        let ring = SecretKeyRing::from_keys(vec![secret]);
        let err = decrypt_message(&armored, &ring, "wrong passphrase").unwrap_err();
        assert!(matches!(err, Error::NoDecryptionKey));
    }

    #[test]
    fn test_multi_key_ring_tolerates_bad_candidates() {
        // One key that does not unlock with this passphrase, one irrelevant
        // key that does, and the actual recipient key. Decryption must
        // still succeed.
        let (locked, _) = generate_key("some other passphrase", "Bob <bob@example.com>");
        let (decoy, _) = generate_key(TEST_PASSPHRASE, "Carol <carol@example.com>");
        let (target, target_public) = generate_key(TEST_PASSPHRASE, "Alice <alice@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![target_public]);
        let armored = encrypt_message(PLAINTEXT, &recipients, None, None, false).unwrap();

        let ring = SecretKeyRing::from_keys(vec![locked, decoy, target]);
        let decrypted = decrypt_message(&armored, &ring, TEST_PASSPHRASE).unwrap();
        assert_eq!(decrypted, PLAINTEXT);
    }

    #[test]
    fn test_unprotected_key_unlocks_with_empty_passphrase() {
        let (secret, public) = generate_key("", "Alice <alice@example.com>");
        let recipients = PublicKeyRing::from_keys(vec![public]);

        let armored = encrypt_message(PLAINTEXT, &recipients, None, None, false).unwrap();

        let ring = SecretKeyRing::from_keys(vec![secret]);
        let decrypted = decrypt_message(&armored, &ring, "").unwrap();
        assert_eq!(decrypted, PLAINTEXT);
    }
}

mod signed {
    use super::*;

    #[test]
    fn test_signed_round_trip_verifies_ok() {
        let (alice_secret, alice_public) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (bob_secret, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let armored = encrypt_message(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(TEST_PASSPHRASE.as_bytes()),
            false,
        )
        .unwrap();

        let verifier = PublicKeyRing::from_keys(vec![alice_public]);
        let ring = SecretKeyRing::from_keys(vec![bob_secret]);
        let result = decrypt_and_verify(
            &armored,
            Some(&verifier),
            &ring,
            TEST_PASSPHRASE,
            VerificationTime::now(),
        )
        .unwrap();

        assert_eq!(result.verdict, Verdict::Ok);
        assert_eq!(result.plaintext, PLAINTEXT);
        assert!(result.detail.is_none());
    }

    #[test]
    fn test_deterministic_clock_round_trip() {
        let (alice_secret, alice_public) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (bob_secret, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");

        let signed_at = chrono::Utc::now();
        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let armored = encrypt_message_with_clock(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(TEST_PASSPHRASE.as_bytes()),
            false,
            &FixedClock(signed_at),
        )
        .unwrap();

        let verifier = PublicKeyRing::from_keys(vec![alice_public]);
        let ring = SecretKeyRing::from_keys(vec![bob_secret]);
        let result = decrypt_and_verify(
            &armored,
            Some(&verifier),
            &ring,
            TEST_PASSPHRASE,
            VerificationTime::At(signed_at.timestamp()),
        )
        .unwrap();

        assert_eq!(result.verdict, Verdict::Ok);
    }

    #[test]
    fn test_no_verifier_ring_yields_no_verifier() {
        let (alice_secret, _) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (bob_secret, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let armored = encrypt_message(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(TEST_PASSPHRASE.as_bytes()),
            false,
        )
        .unwrap();

        let ring = SecretKeyRing::from_keys(vec![bob_secret]);
        let result =
            decrypt_and_verify(&armored, None, &ring, TEST_PASSPHRASE, VerificationTime::now())
                .unwrap();

        assert_eq!(result.verdict, Verdict::NoVerifier);
        assert_eq!(result.plaintext, PLAINTEXT);
    }

    #[test]
    fn test_unrelated_verifier_yields_no_verifier() {
        let (alice_secret, _) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (bob_secret, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");
        let (_, carol_public) = generate_key(TEST_PASSPHRASE, "Carol <c@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let armored = encrypt_message(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(TEST_PASSPHRASE.as_bytes()),
            false,
        )
        .unwrap();

        let verifier = PublicKeyRing::from_keys(vec![carol_public]);
        let ring = SecretKeyRing::from_keys(vec![bob_secret]);
        let result = decrypt_and_verify(
            &armored,
            Some(&verifier),
            &ring,
            TEST_PASSPHRASE,
            VerificationTime::now(),
        )
        .unwrap();

        assert_eq!(result.verdict, Verdict::NoVerifier);
    }

    #[test]
    fn test_signer_locked_produces_no_ciphertext() {
        let (alice_secret, _) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (_, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let err = encrypt_message(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(b"definitely wrong"),
            false,
        )
        .unwrap_err();

        assert!(matches!(err, Error::SignerLocked));
    }

    #[test]
    fn test_disabled_time_check_verifies_ok() {
        let (alice_secret, alice_public) = generate_key(TEST_PASSPHRASE, "Alice <a@example.com>");
        let (bob_secret, bob_public) = generate_key(TEST_PASSPHRASE, "Bob <b@example.com>");

        let recipients = PublicKeyRing::from_keys(vec![bob_public]);
        let signer = SecretKeyRing::from_keys(vec![alice_secret]);

        let armored = encrypt_message(
            PLAINTEXT,
            &recipients,
            Some(&signer),
            Some(TEST_PASSPHRASE.as_bytes()),
            false,
        )
        .unwrap();

        let verifier = PublicKeyRing::from_keys(vec![alice_public]);
        let ring = SecretKeyRing::from_keys(vec![bob_secret]);
        let result = decrypt_and_verify(
            &armored,
            Some(&verifier),
            &ring,
            TEST_PASSPHRASE,
            // The zero sentinel of the original interface: all time checks off.
            VerificationTime::from_unix(0),
        )
        .unwrap();

        assert_eq!(result.verdict, Verdict::Ok);
    }
}

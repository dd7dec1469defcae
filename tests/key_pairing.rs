//! Integration tests for private key loading and pairing

mod common;

use cert_inspector::checks::{load_private_key, KeyPairChecker, SpkiKeyPairChecker};
use cert_inspector::utils::KeyError;
use common::{cert, fixture};

#[test]
fn test_pkcs8_pem_key_matches_certificate() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("leaf.pem"), &fixture("leaf-key.pem"), None)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "EC P-256 (PKCS#8)");
}

#[test]
fn test_der_key_matches_certificate() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("leaf.pem"), &fixture("leaf-key.der"), None)
        .unwrap();
    assert!(outcome.matched);
}

#[test]
fn test_sec1_key_matches_certificate() {
    let info = load_private_key(&fixture("leaf-key-sec1.pem"), None).unwrap();
    assert_eq!(info.key_type, "EC P-256 (SEC1)");
    assert_eq!(info.public_key_spki, cert("leaf.pem").public_key_der());
}

#[test]
fn test_pkcs1_rsa_key_matches_certificate() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("rsa-selfsigned.pem"), &fixture("rsa-key.pem"), None)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "RSA (PKCS#1)");
}

#[test]
fn test_encrypted_key_with_password() {
    let outcome = SpkiKeyPairChecker
        .check_pair(
            &cert("leaf.pem"),
            &fixture("leaf-key-encrypted.pem"),
            Some("hunter2"),
        )
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "EC P-256 (encrypted PKCS#8)");
}

#[test]
fn test_encrypted_key_without_password() {
    let err = load_private_key(&fixture("leaf-key-encrypted.pem"), None).unwrap_err();
    assert_eq!(err, KeyError::PasswordRequired);
}

#[test]
fn test_encrypted_key_with_wrong_password() {
    let err = load_private_key(&fixture("leaf-key-encrypted.pem"), Some("wrong")).unwrap_err();
    assert!(matches!(err, KeyError::Parse { .. }));
}

#[test]
fn test_ed25519_key_matches_certificate() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("ed25519.pem"), &fixture("ed25519-key.pem"), None)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "Ed25519 (PKCS#8)");
}

#[test]
fn test_p521_key_matches_certificate() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("p521.pem"), &fixture("p521-key.pem"), None)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "EC P-521 (PKCS#8)");
}

#[test]
fn test_ed25519_key_against_ec_certificate_is_a_mismatch() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("leaf.pem"), &fixture("ed25519-key.pem"), None)
        .unwrap();
    assert!(!outcome.matched);
}

#[test]
fn test_unsupported_algorithm_names_its_oid() {
    let err = load_private_key(&fixture("ed448-key.pem"), None).unwrap_err();
    assert!(err.to_string().contains("1.3.101.113"));
}

#[test]
fn test_legacy_aes_encrypted_rsa_key() {
    let outcome = SpkiKeyPairChecker
        .check_pair(
            &cert("rsa-selfsigned.pem"),
            &fixture("rsa-key-legacy.pem"),
            Some("hunter2"),
        )
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(outcome.key_type, "RSA (encrypted PKCS#1)");
}

#[test]
fn test_legacy_3des_encrypted_ec_key() {
    let info = load_private_key(&fixture("leaf-key-legacy.pem"), Some("hunter2")).unwrap();
    assert_eq!(info.key_type, "EC P-256 (encrypted SEC1)");
    assert_eq!(info.public_key_spki, cert("leaf.pem").public_key_der());
}

#[test]
fn test_legacy_encrypted_key_without_password() {
    let err = load_private_key(&fixture("rsa-key-legacy.pem"), None).unwrap_err();
    assert_eq!(err, KeyError::PasswordRequired);
}

#[test]
fn test_legacy_encrypted_key_with_wrong_password() {
    let err = load_private_key(&fixture("leaf-key-legacy.pem"), Some("wrong")).unwrap_err();
    assert!(matches!(err, KeyError::Parse { .. }));
}

#[test]
fn test_wrong_key_is_a_mismatch_not_an_error() {
    let outcome = SpkiKeyPairChecker
        .check_pair(&cert("leaf.pem"), &fixture("wrong-key.pem"), None)
        .unwrap();

    assert!(!outcome.matched);
    assert!(outcome.reason.contains("does not correspond"));
}

#[test]
fn test_certificate_is_not_a_key() {
    let err = load_private_key(&fixture("leaf.pem"), None).unwrap_err();
    assert!(matches!(err, KeyError::Parse { .. }));
}

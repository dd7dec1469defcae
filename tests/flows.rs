//! Integration tests for the three validation flows

mod common;

use cert_inspector::certificate::decode_many;
use cert_inspector::config::Settings;
use cert_inspector::models::{OverallStatus, ValidationResult};
use cert_inspector::utils::{CertificateError, InspectorError, KeyError, NetworkError};
use cert_inspector::Inspector;
use common::{fixture, inspector_with, MapSource};

fn check<'a>(results: &'a [ValidationResult], name: &str) -> &'a ValidationResult {
    results
        .iter()
        .find(|r| r.check_name == name)
        .unwrap_or_else(|| panic!("missing check {}", name))
}

fn names(results: &[ValidationResult]) -> Vec<&str> {
    results.iter().map(|r| r.check_name.as_str()).collect()
}

#[tokio::test]
async fn test_cert_and_key_full_success() {
    let inspector = inspector_with(MapSource::test_ca());
    let report = inspector
        .validate_cert_and_key(
            &fixture("leaf.pem"),
            &fixture("leaf-key.pem"),
            None,
            Some("leaf.example.com"),
            true,
        )
        .await
        .unwrap();

    assert_eq!(
        names(&report.validation_results),
        vec![
            "Certificate/Key Match",
            "Validity Period",
            "Domain Verification",
            "Certificate Chain",
            "Chain Order"
        ]
    );
    assert!(report.validation_results.iter().all(|r| r.passed));
    assert_eq!(report.overall_status, OverallStatus::Success);
    assert_eq!(report.chain.len(), 3);
    assert_eq!(
        check(&report.validation_results, "Certificate Chain").message,
        "Complete chain built (3 certificates)"
    );
    assert_eq!(decode_many(report.chain_pem.as_bytes()).unwrap(), report.chain);
}

#[tokio::test]
async fn test_cert_and_key_domain_mismatch_is_a_warning() {
    let inspector = inspector_with(MapSource::test_ca());
    let report = inspector
        .validate_cert_and_key(
            &fixture("leaf.pem"),
            &fixture("leaf-key.pem"),
            None,
            Some("a.b.wild.example.com"),
            false,
        )
        .await
        .unwrap();

    assert!(!check(&report.validation_results, "Domain Verification").passed);
    assert_eq!(report.overall_status, OverallStatus::Warning);
    assert_eq!(report.chain.len(), 1);
    assert!(!names(&report.validation_results).contains(&"Certificate Chain"));
}

#[tokio::test]
async fn test_cert_and_key_without_reachable_issuer() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_cert_and_key(&fixture("leaf.pem"), &fixture("leaf-key.pem"), None, None, true)
        .await
        .unwrap();

    let chain = check(&report.validation_results, "Certificate Chain");
    assert!(!chain.passed);
    assert_eq!(chain.message, "Could not build complete certificate chain");
    assert_eq!(report.overall_status, OverallStatus::Warning);
}

#[tokio::test]
async fn test_key_mismatch_aborts() {
    let inspector = inspector_with(MapSource::test_ca());
    let err = inspector
        .validate_cert_and_key(&fixture("leaf.pem"), &fixture("wrong-key.pem"), None, None, true)
        .await
        .unwrap_err();

    assert!(matches!(err, InspectorError::Key(KeyError::Mismatch { .. })));
}

#[tokio::test]
async fn test_cert_and_key_accepts_ed25519_pair() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_cert_and_key(
            &fixture("ed25519.pem"),
            &fixture("ed25519-key.pem"),
            None,
            Some("ed25519.inspector.test"),
            false,
        )
        .await
        .unwrap();

    assert_eq!(
        names(&report.validation_results),
        vec!["Certificate/Key Match", "Validity Period", "Domain Verification"]
    );
    assert_eq!(report.overall_status, OverallStatus::Success);
}

#[tokio::test]
async fn test_unloadable_key_aborts() {
    let inspector = inspector_with(MapSource::test_ca());
    let err = inspector
        .validate_cert_and_key(&fixture("leaf.pem"), b"not a key", None, None, false)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Private key error"));
}

#[tokio::test]
async fn test_expired_certificate_fails_validity() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_cert_and_key(&fixture("expired.pem"), &fixture("misc-key.pem"), None, None, false)
        .await
        .unwrap();

    let validity = check(&report.validation_results, "Validity Period");
    assert!(!validity.passed);
    assert!(validity.message.contains("has expired"));
}

#[tokio::test]
async fn test_not_yet_valid_certificate_fails_validity() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_cert_and_key(
            &fixture("not-yet-valid.pem"),
            &fixture("misc-key.pem"),
            None,
            None,
            false,
        )
        .await
        .unwrap();

    let validity = check(&report.validation_results, "Validity Period");
    assert!(!validity.passed);
    assert!(validity.message.contains("not yet valid"));
}

#[tokio::test]
async fn test_oversized_input_is_rejected() {
    let mut settings = Settings::default();
    settings.limits.max_input_bytes = 64;
    let inspector = Inspector::new(settings).unwrap();

    let err = inspector
        .validate_chain_file(&fixture("chain.pem"), false)
        .unwrap_err();
    assert!(matches!(
        err,
        InspectorError::Certificate(CertificateError::InputTooLarge { limit: 64, .. })
    ));
}

#[test]
fn test_chain_file_in_order() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("chain.pem"), false)
        .unwrap();

    assert!(report.is_order_correct);
    assert!(report.fixed_chain_pem.is_none());
    assert_eq!(report.overall_status, OverallStatus::Success);
    assert_eq!(
        names(&report.validation_results),
        vec![
            "Certificate Count",
            "Chain Order",
            "Certificate Validity [1]",
            "Certificate Validity [2]",
            "Certificate Validity [3]",
            "Chain Completeness"
        ]
    );
    assert_eq!(
        check(&report.validation_results, "Certificate Count").message,
        "Found 3 certificate(s) in the chain"
    );
    assert!(check(&report.validation_results, "Certificate Validity [1]")
        .message
        .starts_with("leaf.example.com is valid"));
}

#[test]
fn test_chain_file_misordered_is_fixed_without_root() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("misordered-chain.pem"), false)
        .unwrap();

    assert!(!report.is_order_correct);
    assert_eq!(report.overall_status, OverallStatus::Warning);
    assert_eq!(
        check(&report.validation_results, "Chain Order").message,
        "Chain is NOT in correct order (should be: server → intermediate → root)"
    );

    let fixed = decode_many(report.fixed_chain_pem.unwrap().as_bytes()).unwrap();
    let labels: Vec<_> = fixed.iter().map(|c| c.label()).collect();
    assert_eq!(
        labels,
        vec!["leaf.example.com", "Inspector Test Intermediate CA"]
    );

    // The original bundle is kept as supplied
    let original = decode_many(report.chain_pem.as_bytes()).unwrap();
    assert_eq!(original[0].label(), "Inspector Test Intermediate CA");
}

#[test]
fn test_chain_file_misordered_fixed_with_root() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("misordered-chain.pem"), true)
        .unwrap();

    let fixed = decode_many(report.fixed_chain_pem.unwrap().as_bytes()).unwrap();
    assert_eq!(fixed, report.canonical_chain);
    assert_eq!(fixed.len(), 3);
}

#[test]
fn test_chain_file_without_root() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("chain-no-root.pem"), false)
        .unwrap();

    let completeness = check(&report.validation_results, "Chain Completeness");
    assert!(!completeness.passed);
    assert_eq!(
        completeness.message,
        "Chain does not include root certificate (may need to be fetched)"
    );
    assert_eq!(report.overall_status, OverallStatus::Warning);
}

#[test]
fn test_chain_file_with_only_a_root() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("root.pem"), false)
        .unwrap();

    assert!(report.is_order_correct);
    assert!(check(&report.validation_results, "Chain Completeness").passed);
    assert_eq!(
        check(&report.validation_results, "Chain Order").message,
        "Single certificate (no chain to verify)"
    );
}

#[test]
fn test_chain_file_with_expired_member() {
    let mut bundle = fixture("expired.pem");
    bundle.extend_from_slice(&fixture("intermediate.pem"));

    let inspector = inspector_with(MapSource::new());
    let report = inspector.validate_chain_file(&bundle, false).unwrap();

    let validity = check(&report.validation_results, "Certificate Validity [1]");
    assert!(!validity.passed);
    assert!(validity.message.starts_with("expired.example.com has expired"));
}

#[test]
fn test_chain_file_skips_broken_blocks() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("partly-broken-chain.pem"), false)
        .unwrap();

    assert_eq!(report.certs_info.len(), 2);
    assert!(report.is_order_correct);
}

#[test]
fn test_chain_file_without_certificates() {
    let inspector = inspector_with(MapSource::new());
    let err = inspector
        .validate_chain_file(&fixture("leaf-key.pem"), false)
        .unwrap_err();

    assert!(matches!(
        err,
        InspectorError::Certificate(CertificateError::NoCertificates)
    ));
}

#[tokio::test]
async fn test_url_flow_rejects_port_zero() {
    let inspector = inspector_with(MapSource::new());
    let err = inspector
        .validate_from_url("example.com", 0, true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InspectorError::Network(NetworkError::InvalidPort { port: 0 })
    ));
}

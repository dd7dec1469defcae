//! Integration tests for report documents and renderers

mod common;

use cert_inspector::report::{JsonRenderer, ReportDocument, ReportRenderer, TextRenderer};
use common::{fixture, inspector_with, MapSource};

#[test]
fn test_chain_document_json() {
    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("misordered-chain.pem"), false)
        .unwrap();
    let document = ReportDocument::from_chain(&report);

    let bytes = JsonRenderer.render(&document).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["title"], "Certificate Chain Analysis");
    assert_eq!(json["overall_status"], "warning");
    assert_eq!(json["is_order_correct"], false);
    assert_eq!(json["chain"][0]["subject_dn"], "CN=leaf.example.com,OU=Platform,OU=Web,O=Cert Inspector Tests,C=GB");
    assert_eq!(json["supplied_order"].as_array().unwrap().len(), 3);
    assert_eq!(json["validation_results"][1]["check_name"], "Chain Order");
    assert_eq!(json["validation_results"][1]["passed"], false);
    assert_eq!(JsonRenderer.extension(), "json");
}

#[tokio::test]
async fn test_cert_key_document_text() {
    console::set_colors_enabled(false);

    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_cert_and_key(
            &fixture("leaf.pem"),
            &fixture("leaf-key.pem"),
            None,
            Some("leaf.example.com"),
            false,
        )
        .await
        .unwrap();

    let text = String::from_utf8(
        TextRenderer
            .render(&ReportDocument::from_cert_key(&report))
            .unwrap(),
    )
    .unwrap();

    assert!(text.starts_with("Certificate Validation Report\n"));
    assert!(text.contains("Subject: leaf.example.com"));
    assert!(text.contains("Issuer: Inspector Test Intermediate CA"));
    assert!(text.contains("SANs: leaf.example.com, *.wild.example.com, 127.0.0.1"));
    assert!(text.contains("Serial Number: 3fba78a648aed36b"));
    assert!(text.contains("✓ Certificate/Key Match: Certificate and private key match"));
    assert!(text.contains("Overall: success"));
}

#[test]
fn test_chain_document_text_shows_both_orders() {
    console::set_colors_enabled(false);

    let inspector = inspector_with(MapSource::new());
    let report = inspector
        .validate_chain_file(&fixture("misordered-chain.pem"), false)
        .unwrap();
    let text = String::from_utf8(
        TextRenderer
            .render(&ReportDocument::from_chain(&report))
            .unwrap(),
    )
    .unwrap();

    assert!(text.contains("Current order: INCORRECT"));
    assert!(text.contains("  1. Inspector Test Intermediate CA (CA)"));
    assert!(text.contains("Correct chain order should be:"));
    assert!(text.contains("  1. leaf.example.com (End-entity)"));
    assert!(text.contains("✗ Chain Order"));
}

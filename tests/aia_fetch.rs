//! Integration tests for AIA intermediate fetching

mod common;

use cert_inspector::certificate::{AiaFetcher, HttpIssuerSource, IssuerSource};
use cert_inspector::config::AiaSettings;
use cert_inspector::utils::NetworkError;
use common::{cert, fixture, MapSource};

fn labels(certs: &[cert_inspector::Certificate]) -> Vec<String> {
    certs.iter().map(|c| c.label()).collect()
}

#[tokio::test]
async fn test_fetch_up_chain_to_root() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 8);
    let fetched = fetcher.fetch_up_chain(&cert("leaf.pem")).await;

    assert_eq!(
        labels(&fetched),
        vec!["Inspector Test Intermediate CA", "Inspector Test Root CA"]
    );
}

#[tokio::test]
async fn test_build_full_chain_starts_with_leaf() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 8);
    let leaf = cert("leaf.pem");
    let chain = fetcher.build_full_chain(&leaf).await;

    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], leaf);
    assert!(chain[2].is_self_signed());
}

#[tokio::test]
async fn test_self_signed_start_fetches_nothing() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 8);
    assert!(fetcher.fetch_up_chain(&cert("root.pem")).await.is_empty());
}

#[tokio::test]
async fn test_no_aia_fetches_nothing() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 8);
    assert!(fetcher.fetch_up_chain(&cert("bare.pem")).await.is_empty());
}

#[tokio::test]
async fn test_cycle_is_stopped_by_seen_urls() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 8);
    let fetched = fetcher.fetch_up_chain(&cert("loop.pem")).await;

    // loop.pem points at itself: fetched once, then the URL repeats
    assert_eq!(labels(&fetched), vec!["Inspector Loop CA"]);
}

#[tokio::test]
async fn test_hop_limit_bounds_the_walk() {
    let fetcher = AiaFetcher::new(MapSource::test_ca(), 1);
    let fetched = fetcher.fetch_up_chain(&cert("leaf.pem")).await;
    assert_eq!(labels(&fetched), vec!["Inspector Test Intermediate CA"]);
}

#[tokio::test]
async fn test_failed_hop_returns_partial_chain() {
    let source = MapSource::new().with("http://ca.test/intermediate.der", fixture("intermediate.pem"));
    let fetcher = AiaFetcher::new(source, 8);
    let fetched = fetcher.fetch_up_chain(&cert("leaf.pem")).await;

    assert_eq!(labels(&fetched), vec!["Inspector Test Intermediate CA"]);
}

#[tokio::test]
async fn test_undecodable_issuer_stops_quietly() {
    let source = MapSource::new().with("http://ca.test/intermediate.der", b"<html>nope</html>".to_vec());
    let fetcher = AiaFetcher::new(source, 8);
    assert!(fetcher.fetch_up_chain(&cert("leaf.pem")).await.is_empty());
}

#[tokio::test]
async fn test_unreachable_aia_url_returns_empty() {
    let settings = AiaSettings {
        fetch_timeout_secs: 2,
        ..AiaSettings::default()
    };
    let fetcher = AiaFetcher::http(&settings).unwrap();

    // orphan.pem points at http://127.0.0.1:9/missing.der
    let fetched = fetcher.fetch_up_chain(&cert("orphan.pem")).await;
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn test_http_source_downloads_der() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/intermediate.der")
        .with_status(200)
        .with_header("content-type", "application/pkix-cert")
        .with_body(fixture("leaf.der"))
        .create_async()
        .await;

    let source = HttpIssuerSource::new(&AiaSettings::default()).unwrap();
    let body = source
        .fetch(&format!("{}/intermediate.der", server.url()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body, fixture("leaf.der"));
}

#[tokio::test]
async fn test_http_source_reports_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing.der")
        .with_status(404)
        .create_async()
        .await;

    let source = HttpIssuerSource::new(&AiaSettings::default()).unwrap();
    let url = format!("{}/missing.der", server.url());
    let err = source.fetch(&url).await.unwrap_err();

    assert!(matches!(err, NetworkError::Fetch { url: ref u, .. } if *u == url));
}

#[tokio::test]
async fn test_http_source_rejects_oversized_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/big.der")
        .with_status(200)
        .with_body(vec![0u8; 2048])
        .create_async()
        .await;

    let settings = AiaSettings {
        max_response_bytes: 1024,
        ..AiaSettings::default()
    };
    let source = HttpIssuerSource::new(&settings).unwrap();
    let err = source
        .fetch(&format!("{}/big.der", server.url()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("too large"));
}

//! Shared helpers for integration tests

#![allow(dead_code)]

use cert_inspector::certificate::{AiaFetcher, Certificate, IssuerSource};
use cert_inspector::checks::SpkiKeyPairChecker;
use cert_inspector::config::Settings;
use cert_inspector::utils::NetworkError;
use cert_inspector::Inspector;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixtures_dir().join(name)).expect("fixture should exist")
}

pub fn cert(name: &str) -> Certificate {
    cert_inspector::certificate::decode_one(&fixture(name)).expect("fixture should decode")
}

/// Issuer source backed by an in-memory URL map
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    responses: HashMap<String, Vec<u8>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    /// The test CA hierarchy as published at its AIA URLs
    pub fn test_ca() -> Self {
        Self::new()
            .with("http://ca.test/intermediate.der", fixture("intermediate.pem"))
            .with("http://ca.test/root.der", fixture("root.pem"))
            .with("http://ca.test/loop.der", fixture("loop.pem"))
    }
}

impl IssuerSource for MapSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| NetworkError::Fetch {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}

pub fn inspector_with(source: MapSource) -> Inspector<MapSource, SpkiKeyPairChecker> {
    let settings = Settings::default();
    let fetcher = AiaFetcher::new(source, settings.aia.max_hops);
    Inspector::with_parts(settings, fetcher, SpkiKeyPairChecker)
}

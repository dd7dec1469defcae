//! Missing-intermediate discovery via Authority Information Access
//!
//! Follows the "CA Issuers" URL of a certificate, downloads the issuer,
//! and repeats from the downloaded certificate. Every failure ends the walk
//! quietly: the certificates gathered so far are returned and the problem
//! is logged.

use crate::certificate::decoder::decode_one;
use crate::certificate::info::Certificate;
use crate::config::AiaSettings;
use crate::utils::NetworkError;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, warn};

/// Source of issuer certificate bytes for a CA Issuers URL
pub trait IssuerSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, NetworkError>> + Send;
}

/// Downloads issuer certificates over HTTP(S) with a bounded timeout
#[derive(Debug, Clone)]
pub struct HttpIssuerSource {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpIssuerSource {
    pub fn new(settings: &AiaSettings) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .connect_timeout(settings.fetch_timeout())
            .user_agent(concat!("cert-inspector/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetworkError::Fetch {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_response_bytes: settings.max_response_bytes,
        })
    }
}

impl IssuerSource for HttpIssuerSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        let fetch_error = |message: String| NetworkError::Fetch {
            url: url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;

        if let Some(len) = resp.content_length() {
            if len as usize > self.max_response_bytes {
                return Err(fetch_error(format!("response of {} bytes is too large", len)));
            }
        }

        let bytes = resp.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        if bytes.len() > self.max_response_bytes {
            return Err(fetch_error(format!(
                "response of {} bytes is too large",
                bytes.len()
            )));
        }

        Ok(bytes.to_vec())
    }
}

/// Walks AIA pointers up a certificate chain
#[derive(Debug, Clone)]
pub struct AiaFetcher<S> {
    source: S,
    max_hops: usize,
}

impl AiaFetcher<HttpIssuerSource> {
    /// Fetcher backed by HTTP downloads
    pub fn http(settings: &AiaSettings) -> Result<Self, NetworkError> {
        Ok(Self::new(HttpIssuerSource::new(settings)?, settings.max_hops))
    }
}

impl<S: IssuerSource> AiaFetcher<S> {
    pub fn new(source: S, max_hops: usize) -> Self {
        Self { source, max_hops }
    }

    /// Fetch the issuers above `start`, nearest first, excluding `start`.
    ///
    /// Stops at a self-signed certificate, a certificate without a CA Issuers
    /// URL, an already visited URL, the hop limit, or the first failed
    /// download or decode.
    pub async fn fetch_up_chain(&self, start: &Certificate) -> Vec<Certificate> {
        let mut fetched: Vec<Certificate> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        loop {
            let current = fetched.last().unwrap_or(start);

            if current.is_self_signed() {
                debug!(subject = %current.subject(), "Reached self-signed root");
                break;
            }

            let url = match current.ca_issuer_urls().first() {
                Some(url) => url.clone(),
                None => {
                    debug!(subject = %current.subject(), "No CA Issuers URL");
                    break;
                }
            };

            if !seen_urls.insert(url.clone()) {
                warn!(url = %url, "AIA cycle detected, stopping");
                break;
            }

            if fetched.len() >= self.max_hops {
                warn!(max_hops = self.max_hops, "AIA hop limit reached, stopping");
                break;
            }

            let data = match self.source.fetch(&url).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to fetch intermediate certificate");
                    break;
                }
            };

            match decode_one(&data) {
                Ok(cert) => {
                    debug!(url = %url, subject = %cert.subject(), "Fetched issuer certificate");
                    fetched.push(cert);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Fetched issuer is not a certificate");
                    break;
                }
            }
        }

        fetched
    }

    /// The leaf followed by every issuer reachable through AIA
    pub async fn build_full_chain(&self, leaf: &Certificate) -> Vec<Certificate> {
        let mut chain = vec![leaf.clone()];
        chain.extend(self.fetch_up_chain(leaf).await);
        chain
    }
}

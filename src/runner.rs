//! Validation orchestration
//!
//! Composes decoding, metadata extraction, key pairing, domain matching,
//! chain ordering and AIA completion into the three inspection flows. Each
//! flow owns its scratch state and returns a report or a single error.

use crate::certificate::{
    decode_many, decode_one, extract_info, matches_domain, resolve_order, AiaFetcher, Certificate,
    CertificateInfo, HttpIssuerSource, IssuerSource,
};
use crate::checks::{EndpointRetriever, KeyPairChecker, SpkiKeyPairChecker};
use crate::config::Settings;
use crate::models::{CertKeyReport, ChainReport, OverallStatus, UrlReport, ValidationResult};
use crate::report::PemExporter;
use crate::utils::{CertificateError, KeyError, NetworkError, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Runs validation flows with a fixed configuration
pub struct Inspector<S = HttpIssuerSource, K = SpkiKeyPairChecker> {
    settings: Settings,
    fetcher: AiaFetcher<S>,
    retriever: EndpointRetriever,
    key_checker: K,
}

impl Inspector {
    /// Inspector that downloads issuers over HTTP and pairs keys by SPKI
    pub fn new(settings: Settings) -> Result<Self> {
        let fetcher = AiaFetcher::http(&settings.aia)?;
        Ok(Self::with_parts(settings, fetcher, SpkiKeyPairChecker))
    }
}

impl<S: IssuerSource, K: KeyPairChecker> Inspector<S, K> {
    pub fn with_parts(settings: Settings, fetcher: AiaFetcher<S>, key_checker: K) -> Self {
        let retriever = EndpointRetriever::new(settings.network.clone());
        Self {
            settings,
            fetcher,
            retriever,
            key_checker,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate a certificate against its private key.
    ///
    /// Fails outright when the input is oversized or undecodable, when the
    /// key cannot be loaded, or when the key does not belong to the
    /// certificate. Everything else is reported as a check result.
    pub async fn validate_cert_and_key(
        &self,
        cert_data: &[u8],
        key_data: &[u8],
        password: Option<&str>,
        domain: Option<&str>,
        verify_chain: bool,
    ) -> Result<CertKeyReport> {
        self.check_size(cert_data)?;
        self.check_size(key_data)?;

        let cert = decode_one(cert_data)?;
        let cert_info = extract_info(&cert);
        info!(subject = %cert.subject(), "Validating certificate and key");

        let pairing = self.key_checker.check_pair(&cert, key_data, password)?;
        if !pairing.matched {
            return Err(KeyError::Mismatch {
                reason: pairing.reason,
            }
            .into());
        }

        let chain = if verify_chain {
            self.fetcher.build_full_chain(&cert).await
        } else {
            vec![cert.clone()]
        };

        let now = Utc::now();
        let mut results = vec![
            ValidationResult::pass("Certificate/Key Match", pairing.reason),
            validity_check(&cert, now),
        ];

        if let Some(domain) = domain.map(str::trim).filter(|d| !d.is_empty()) {
            let outcome = matches_domain(&cert, Some(domain));
            results.push(ValidationResult::from_outcome(
                "Domain Verification",
                outcome.matched,
                outcome.message,
            ));
        }

        if verify_chain {
            if chain.len() > 1 {
                results.push(ValidationResult::pass(
                    "Certificate Chain",
                    format!("Complete chain built ({} certificates)", chain.len()),
                ));
                results.push(chain_order_check(&chain, "Chain order may not be correct")?);
            } else {
                results.push(ValidationResult::fail(
                    "Certificate Chain",
                    "Could not build complete certificate chain",
                ));
            }
        }

        let overall_status = OverallStatus::from_results(&results);
        debug!(status = %overall_status, checks = results.len(), "Certificate/key validation done");

        Ok(CertKeyReport {
            cert_info,
            chain_info: infos(&chain),
            chain_pem: PemExporter::export_chain(&chain),
            chain,
            validation_results: results,
            overall_status,
        })
    }

    /// Retrieve and validate the certificate served at `url` on `port`.
    ///
    /// When the server sends no intermediates, the chain is completed
    /// through AIA instead.
    pub async fn validate_from_url(
        &self,
        url: &str,
        port: u16,
        check_hostname: bool,
    ) -> Result<UrlReport> {
        if port == 0 {
            return Err(NetworkError::InvalidPort { port }.into());
        }

        let endpoint = self.retriever.fetch(url, port).await?;
        let cert = endpoint.leaf;
        let cert_info = extract_info(&cert);
        info!(host = %endpoint.hostname, port, subject = %cert.subject(), "Validating endpoint certificate");

        let chain = if endpoint.peer_chain.len() <= 1 {
            debug!("Peer sent no intermediates, completing chain via AIA");
            self.fetcher.build_full_chain(&cert).await
        } else {
            endpoint.peer_chain
        };

        let mut results = vec![validity_check(&cert, Utc::now())];

        if check_hostname {
            let outcome = matches_domain(&cert, Some(&endpoint.hostname));
            results.push(ValidationResult::from_outcome(
                "Hostname Verification",
                outcome.matched,
                outcome.message,
            ));
        }

        if chain.len() > 1 {
            results.push(ValidationResult::pass(
                "Certificate Chain",
                format!("Certificate chain contains {} certificates", chain.len()),
            ));
            results.push(chain_order_check(&chain, "Chain may not be in correct order")?);
        } else {
            results.push(ValidationResult::fail(
                "Certificate Chain",
                "Only single certificate found (no chain)",
            ));
        }

        let overall_status = OverallStatus::from_results(&results);
        debug!(status = %overall_status, checks = results.len(), "Endpoint validation done");

        Ok(UrlReport {
            cert_info,
            chain_info: infos(&chain),
            chain_pem: PemExporter::export_chain(&chain),
            chain,
            validation_results: results,
            overall_status,
            resolved_hostname: endpoint.hostname,
        })
    }

    /// Analyse a PEM bundle: order, per-certificate validity and whether a
    /// root is included.
    ///
    /// Undecodable blocks are skipped; a bundle with nothing decodable fails
    /// with [`CertificateError::NoCertificates`].
    pub fn validate_chain_file(&self, data: &[u8], include_root: bool) -> Result<ChainReport> {
        self.check_size(data)?;

        let certificates = decode_many(data)?;
        if certificates.is_empty() {
            return Err(CertificateError::NoCertificates.into());
        }
        info!(count = certificates.len(), "Validating certificate chain file");

        let certs_info = infos(&certificates);
        let order = resolve_order(&certificates)?;
        let now = Utc::now();

        let mut results = vec![
            ValidationResult::pass(
                "Certificate Count",
                format!("Found {} certificate(s) in the chain", certificates.len()),
            ),
            if order.is_ordered {
                ValidationResult::pass("Chain Order", order.note.clone())
            } else {
                ValidationResult::fail(
                    "Chain Order",
                    "Chain is NOT in correct order (should be: server → intermediate → root)",
                )
            },
        ];

        for (i, cert) in certificates.iter().enumerate() {
            let name = cert
                .common_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Certificate {}", i + 1));
            results.push(named_validity_check(
                format!("Certificate Validity [{}]", i + 1),
                &name,
                cert,
                now,
            ));
        }

        let has_root = certificates.iter().any(Certificate::is_self_signed);
        results.push(if has_root {
            ValidationResult::pass("Chain Completeness", "Chain includes root certificate")
        } else {
            ValidationResult::fail(
                "Chain Completeness",
                "Chain does not include root certificate (may need to be fetched)",
            )
        });

        let fixed_chain_pem = (!order.is_ordered).then(|| {
            if include_root {
                PemExporter::export_chain(&order.canonical)
            } else {
                PemExporter::export_chain_without_roots(&order.canonical)
            }
        });

        let overall_status = OverallStatus::from_results(&results);
        debug!(status = %overall_status, ordered = order.is_ordered, "Chain file validation done");

        Ok(ChainReport {
            certs_info,
            chain_pem: PemExporter::export_chain(&certificates),
            canonical_chain: order.canonical,
            is_order_correct: order.is_ordered,
            validation_results: results,
            overall_status,
            fixed_chain_pem,
        })
    }

    fn check_size(&self, data: &[u8]) -> std::result::Result<(), CertificateError> {
        let limit = self.settings.limits.max_input_bytes;
        if data.len() > limit {
            return Err(CertificateError::InputTooLarge {
                size: data.len(),
                limit,
            });
        }
        Ok(())
    }
}

fn infos(chain: &[Certificate]) -> Vec<CertificateInfo> {
    chain.iter().map(extract_info).collect()
}

fn validity_check(cert: &Certificate, now: DateTime<Utc>) -> ValidationResult {
    named_validity_check("Validity Period".to_string(), "Certificate", cert, now)
}

fn named_validity_check(
    check_name: String,
    subject: &str,
    cert: &Certificate,
    now: DateTime<Utc>,
) -> ValidationResult {
    if now < cert.not_before() {
        ValidationResult::fail(
            check_name,
            format!("{} is not yet valid (starts {})", subject, cert.not_before()),
        )
    } else if now > cert.not_after() {
        ValidationResult::fail(
            check_name,
            format!("{} has expired ({})", subject, cert.not_after()),
        )
    } else {
        ValidationResult::pass(
            check_name,
            format!(
                "{} is valid ({} days until expiry)",
                subject,
                cert.days_until_expiry(now)
            ),
        )
    }
}

fn chain_order_check(
    chain: &[Certificate],
    failure_message: &str,
) -> std::result::Result<ValidationResult, CertificateError> {
    let order = resolve_order(chain)?;
    Ok(if order.is_ordered {
        ValidationResult::pass("Chain Order", order.note)
    } else {
        ValidationResult::fail("Chain Order", failure_message)
    })
}

//! Results of the three validation flows

use super::{OverallStatus, ValidationResult};
use crate::certificate::{Certificate, CertificateInfo};
use serde::Serialize;

/// Result of validating a certificate against its private key
#[derive(Debug, Clone, Serialize)]
pub struct CertKeyReport {
    pub cert_info: CertificateInfo,
    /// Leaf first, then any issuers found through AIA
    #[serde(skip)]
    pub chain: Vec<Certificate>,
    pub chain_info: Vec<CertificateInfo>,
    pub validation_results: Vec<ValidationResult>,
    pub overall_status: OverallStatus,
    /// PEM concatenation of `chain`
    pub chain_pem: String,
}

/// Result of inspecting a live TLS endpoint
#[derive(Debug, Clone, Serialize)]
pub struct UrlReport {
    pub cert_info: CertificateInfo,
    #[serde(skip)]
    pub chain: Vec<Certificate>,
    pub chain_info: Vec<CertificateInfo>,
    pub validation_results: Vec<ValidationResult>,
    pub overall_status: OverallStatus,
    pub resolved_hostname: String,
    pub chain_pem: String,
}

/// Result of analysing a chain file
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub certs_info: Vec<CertificateInfo>,
    /// Leaf-to-root order followed by leftovers
    #[serde(skip)]
    pub canonical_chain: Vec<Certificate>,
    pub is_order_correct: bool,
    pub validation_results: Vec<ValidationResult>,
    pub overall_status: OverallStatus,
    /// PEM of the certificates in input order
    pub chain_pem: String,
    /// Reordered PEM, present only when the input order was wrong
    pub fixed_chain_pem: Option<String>,
}

//! Certificate information structures

use crate::certificate::name::{DistinguishedName, NameAttribute};
use crate::report::PemExporter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key usage flags from the Key Usage extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyUsageFlag {
    DigitalSignature,
    ContentCommitment,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
}

impl KeyUsageFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsageFlag::DigitalSignature => "digitalSignature",
            KeyUsageFlag::ContentCommitment => "contentCommitment",
            KeyUsageFlag::KeyEncipherment => "keyEncipherment",
            KeyUsageFlag::DataEncipherment => "dataEncipherment",
            KeyUsageFlag::KeyAgreement => "keyAgreement",
            KeyUsageFlag::KeyCertSign => "keyCertSign",
            KeyUsageFlag::CrlSign => "crlSign",
            KeyUsageFlag::EncipherOnly => "encipherOnly",
            KeyUsageFlag::DecipherOnly => "decipherOnly",
        }
    }
}

impl fmt::Display for KeyUsageFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject Alternative Name entry
///
/// Only DNS names are interpreted; every other type is kept as display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectAltName {
    Dns(String),
    Other(String),
}

impl SubjectAltName {
    pub fn value(&self) -> &str {
        match self {
            SubjectAltName::Dns(v) | SubjectAltName::Other(v) => v,
        }
    }

    pub fn as_dns(&self) -> Option<&str> {
        match self {
            SubjectAltName::Dns(v) => Some(v),
            SubjectAltName::Other(_) => None,
        }
    }
}

impl fmt::Display for SubjectAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// A decoded X.509 certificate.
///
/// Every field is read once from the DER encoding and never changes
/// afterwards. Two certificates are equal when their DER encodings are
/// byte-identical.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub(crate) der: Vec<u8>,
    pub(crate) version: u32,
    pub(crate) subject: DistinguishedName,
    pub(crate) issuer: DistinguishedName,
    pub(crate) serial_number: String,
    pub(crate) not_before: DateTime<Utc>,
    pub(crate) not_after: DateTime<Utc>,
    pub(crate) subject_alt_names: Vec<SubjectAltName>,
    pub(crate) is_ca: bool,
    pub(crate) key_usage: Vec<KeyUsageFlag>,
    pub(crate) extended_key_usage: Vec<String>,
    pub(crate) signature_algorithm: String,
    pub(crate) ca_issuer_urls: Vec<String>,
    pub(crate) ocsp_urls: Vec<String>,
    pub(crate) public_key_der: Vec<u8>,
}

impl Certificate {
    /// Raw DER encoding
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// X.509 version (1, 2 or 3)
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Serial number as lowercase hexadecimal without leading zeros
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn subject_alt_names(&self) -> &[SubjectAltName] {
        &self.subject_alt_names
    }

    /// CA flag from Basic Constraints (false when the extension is absent)
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    pub fn key_usage(&self) -> &[KeyUsageFlag] {
        &self.key_usage
    }

    pub fn extended_key_usage(&self) -> &[String] {
        &self.extended_key_usage
    }

    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    /// "CA Issuers" URLs from Authority Information Access, in extension order
    pub fn ca_issuer_urls(&self) -> &[String] {
        &self.ca_issuer_urls
    }

    /// OCSP responder URLs from Authority Information Access
    pub fn ocsp_urls(&self) -> &[String] {
        &self.ocsp_urls
    }

    /// DER-encoded SubjectPublicKeyInfo
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    pub fn common_name(&self) -> Option<&str> {
        self.subject.common_name()
    }

    /// DNS-type SAN values
    pub fn dns_names(&self) -> impl Iterator<Item = &str> {
        self.subject_alt_names.iter().filter_map(|san| san.as_dns())
    }

    /// Subject equals issuer (a root terminating a chain)
    pub fn is_self_signed(&self) -> bool {
        self.subject.canonical() == self.issuer.canonical()
    }

    /// Whether `now` lies within the inclusive validity window
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && now <= self.not_after
    }

    /// Whole days remaining until `not_after`
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_days()
    }

    pub fn fingerprint_sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }

    /// Encode as a PEM `CERTIFICATE` block
    pub fn to_pem(&self) -> String {
        PemExporter::export_certificate(self)
    }

    /// Display label: the subject CN, falling back to the full subject
    pub fn label(&self) -> String {
        self.common_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.subject.to_string())
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

/// Descriptive certificate information for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub version: String,
    pub serial_number: String,
    pub subject: Vec<NameAttribute>,
    pub issuer: Vec<NameAttribute>,
    pub subject_dn: String,
    pub issuer_dn: String,
    pub subject_alt_names: Vec<String>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub signature_algorithm: String,
    pub is_ca: bool,
    pub is_self_signed: bool,
    pub key_usage: Vec<KeyUsageFlag>,
    pub extended_key_usage: Vec<String>,
    pub fingerprint_sha256: String,
    pub ca_issuers: Vec<String>,
    pub ocsp_responders: Vec<String>,
}

impl CertificateInfo {
    /// Subject attribute by long name (`commonName`, `organizationName`, ...)
    pub fn subject_attr(&self, name: &str) -> Option<&str> {
        last_value(&self.subject, name)
    }

    /// Issuer attribute by long name
    pub fn issuer_attr(&self, name: &str) -> Option<&str> {
        last_value(&self.issuer, name)
    }

    /// Get validity period in days
    pub fn validity_period_days(&self) -> i64 {
        (self.not_after - self.not_before).num_days()
    }
}

fn last_value<'a>(attrs: &'a [NameAttribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .rev()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

/// Assemble the descriptive fields of a certificate.
///
/// Optional extensions have already been resolved to their defaults at
/// decode time, so this never fails.
pub fn extract_info(cert: &Certificate) -> CertificateInfo {
    CertificateInfo {
        version: format!("v{}", cert.version),
        serial_number: cert.serial_number.clone(),
        subject: cert.subject.attributes().to_vec(),
        issuer: cert.issuer.attributes().to_vec(),
        subject_dn: cert.subject.to_string(),
        issuer_dn: cert.issuer.to_string(),
        subject_alt_names: cert
            .subject_alt_names
            .iter()
            .map(|san| san.value().to_string())
            .collect(),
        not_before: cert.not_before,
        not_after: cert.not_after,
        signature_algorithm: cert.signature_algorithm.clone(),
        is_ca: cert.is_ca,
        is_self_signed: cert.is_self_signed(),
        key_usage: cert.key_usage.clone(),
        extended_key_usage: cert.extended_key_usage.clone(),
        fingerprint_sha256: cert.fingerprint_sha256(),
        ca_issuers: cert.ca_issuer_urls.clone(),
        ocsp_responders: cert.ocsp_urls.clone(),
    }
}

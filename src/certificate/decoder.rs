//! Certificate decoding
//!
//! Accepts PEM (`-----BEGIN CERTIFICATE-----`) or raw DER input and turns it
//! into owned [`Certificate`] values using x509-parser.

use crate::certificate::info::{Certificate, KeyUsageFlag, SubjectAltName};
use crate::certificate::name::DistinguishedName;
use crate::utils::CertificateError;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::{OID_PKIX_AUTHORITY_INFO_ACCESS, OID_X509_EXT_EXTENDED_KEY_USAGE};
use x509_parser::prelude::*;

const PEM_BEGIN: &[u8] = b"-----BEGIN";
const CERT_BEGIN: &[u8] = b"-----BEGIN CERTIFICATE-----";
const CERT_END: &[u8] = b"-----END CERTIFICATE-----";

const OID_AIA_OCSP: &str = "1.3.6.1.5.5.7.48.1";
const OID_AIA_CA_ISSUERS: &str = "1.3.6.1.5.5.7.48.2";

/// Decode a single certificate from PEM or DER bytes.
///
/// Input whose trimmed form starts with a PEM marker is parsed as PEM,
/// anything else as DER.
pub fn decode_one(data: &[u8]) -> Result<Certificate, CertificateError> {
    let trimmed = data.trim_ascii();

    if trimmed.starts_with(PEM_BEGIN) {
        let block = ::pem::parse(trimmed)
            .map_err(|e| CertificateError::decode(format!("invalid PEM: {}", e)))?;
        if block.tag() != "CERTIFICATE" {
            return Err(CertificateError::decode(format!(
                "expected a CERTIFICATE block, found {}",
                block.tag()
            )));
        }
        Certificate::from_der(block.contents())
    } else {
        Certificate::from_der(data)
    }
}

/// Decode every certificate found in a buffer.
///
/// PEM blocks are decoded independently and a block that fails is skipped
/// with a warning. A buffer without any PEM marker is decoded as exactly one
/// DER certificate, and that failure is returned. An empty vector means no
/// certificate could be recovered at all.
pub fn decode_many(data: &[u8]) -> Result<Vec<Certificate>, CertificateError> {
    if find(data, PEM_BEGIN).is_none() {
        return Ok(vec![Certificate::from_der(data)?]);
    }

    let mut certificates = Vec::new();
    let mut rest = data;
    let mut index = 0usize;

    while let Some(start) = find(rest, CERT_BEGIN) {
        let body_start = start + CERT_BEGIN.len();
        let (body, next) = match find(&rest[body_start..], CERT_END) {
            Some(end) => (
                &rest[body_start..body_start + end],
                &rest[body_start + end + CERT_END.len()..],
            ),
            None => (&rest[body_start..], &rest[rest.len()..]),
        };

        let mut block = Vec::with_capacity(body.len() + CERT_BEGIN.len() + CERT_END.len());
        block.extend_from_slice(CERT_BEGIN);
        block.extend_from_slice(body);
        block.extend_from_slice(CERT_END);

        match decode_one(&block) {
            Ok(cert) => certificates.push(cert),
            Err(e) => warn!(index, error = %e, "Skipping certificate block that failed to decode"),
        }

        index += 1;
        rest = next;
    }

    debug!(count = certificates.len(), blocks = index, "Decoded certificate bundle");
    Ok(certificates)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl Certificate {
    /// Decode a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (rem, cert) = X509Certificate::from_der(der)
            .map_err(|e| CertificateError::decode(format!("{:?}", e)))?;

        if !rem.is_empty() {
            return Err(CertificateError::decode(format!(
                "{} trailing bytes after certificate",
                rem.len()
            )));
        }

        let version = cert.version().0 + 1; // X.509 version is 0-indexed
        if version > 3 {
            return Err(CertificateError::decode(format!(
                "unsupported X.509 version {}",
                version
            )));
        }

        let not_before = asn1_time_to_datetime(cert.validity().not_before)?;
        let not_after = asn1_time_to_datetime(cert.validity().not_after)?;
        let (ca_issuer_urls, ocsp_urls) = extract_aia(&cert);

        Ok(Certificate {
            der: der.to_vec(),
            version,
            subject: DistinguishedName::from_x509(cert.subject()),
            issuer: DistinguishedName::from_x509(cert.issuer()),
            serial_number: format!("{:x}", cert.serial),
            not_before,
            not_after,
            subject_alt_names: extract_san(&cert),
            is_ca: extract_is_ca(&cert),
            key_usage: extract_key_usage(&cert),
            extended_key_usage: extract_extended_key_usage(&cert),
            signature_algorithm: signature_algorithm_name(
                &cert.signature_algorithm.algorithm.to_id_string(),
            ),
            ca_issuer_urls,
            ocsp_urls,
            public_key_der: cert.public_key().raw.to_vec(),
        })
    }
}

fn extract_san(cert: &X509Certificate) -> Vec<SubjectAltName> {
    let mut sans = Vec::new();

    match cert.subject_alternative_name() {
        Ok(Some(san_ext)) => {
            for name in &san_ext.value.general_names {
                let entry = match name {
                    GeneralName::DNSName(dns) => SubjectAltName::Dns(dns.to_string()),
                    GeneralName::IPAddress(ip) => SubjectAltName::Other(format_ip(ip)),
                    GeneralName::RFC822Name(email) => SubjectAltName::Other(email.to_string()),
                    GeneralName::URI(uri) => SubjectAltName::Other(uri.to_string()),
                    GeneralName::DirectoryName(dn) => SubjectAltName::Other(dn.to_string()),
                    GeneralName::RegisteredID(oid) => SubjectAltName::Other(oid.to_id_string()),
                    other => SubjectAltName::Other(format!("{:?}", other)),
                };
                sans.push(entry);
            }
        }
        Ok(None) => {}
        Err(e) => debug!(error = %e, "Ignoring unreadable subjectAltName extension"),
    }

    sans
}

fn format_ip(ip: &[u8]) -> String {
    match ip.len() {
        4 => std::net::Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3]).to_string(),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(ip);
            std::net::Ipv6Addr::from(octets).to_string()
        }
        _ => hex::encode(ip),
    }
}

fn extract_is_ca(cert: &X509Certificate) -> bool {
    cert.basic_constraints()
        .map(|bc| bc.map(|ext| ext.value.ca).unwrap_or(false))
        .unwrap_or(false)
}

fn extract_key_usage(cert: &X509Certificate) -> Vec<KeyUsageFlag> {
    let mut usages = Vec::new();

    if let Ok(Some(ku)) = cert.key_usage() {
        let flags = ku.value;
        let basic = [
            (flags.digital_signature(), KeyUsageFlag::DigitalSignature),
            (flags.non_repudiation(), KeyUsageFlag::ContentCommitment),
            (flags.key_encipherment(), KeyUsageFlag::KeyEncipherment),
            (flags.data_encipherment(), KeyUsageFlag::DataEncipherment),
            (flags.key_agreement(), KeyUsageFlag::KeyAgreement),
            (flags.key_cert_sign(), KeyUsageFlag::KeyCertSign),
            (flags.crl_sign(), KeyUsageFlag::CrlSign),
        ];
        usages.extend(basic.iter().filter(|(set, _)| *set).map(|(_, flag)| *flag));

        // encipherOnly/decipherOnly only carry meaning alongside keyAgreement
        if flags.key_agreement() {
            if flags.encipher_only() {
                usages.push(KeyUsageFlag::EncipherOnly);
            }
            if flags.decipher_only() {
                usages.push(KeyUsageFlag::DecipherOnly);
            }
        }
    }

    usages
}

/// Extended key usages in extension order.
///
/// Read from the raw extension value because the typed x509-parser view
/// does not preserve ordering.
fn extract_extended_key_usage(cert: &X509Certificate) -> Vec<String> {
    let ext = match cert.get_extension_unique(&OID_X509_EXT_EXTENDED_KEY_USAGE) {
        Ok(Some(ext)) => ext,
        _ => return Vec::new(),
    };

    let obj = match der_parser::parse_der(ext.value) {
        Ok((_, obj)) => obj,
        Err(e) => {
            debug!(error = ?e, "Ignoring unreadable extendedKeyUsage extension");
            return Vec::new();
        }
    };

    obj.as_sequence()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_oid().ok())
                .map(|oid| extended_key_usage_name(&oid.to_id_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// CA Issuers and OCSP URLs from the Authority Information Access extension
fn extract_aia(cert: &X509Certificate) -> (Vec<String>, Vec<String>) {
    let mut ca_issuers = Vec::new();
    let mut ocsp = Vec::new();

    if let Ok(Some(ext)) = cert.get_extension_unique(&OID_PKIX_AUTHORITY_INFO_ACCESS) {
        if let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() {
            for desc in &aia.accessdescs {
                if let GeneralName::URI(uri) = &desc.access_location {
                    match desc.access_method.to_id_string().as_str() {
                        OID_AIA_CA_ISSUERS => ca_issuers.push(uri.to_string()),
                        OID_AIA_OCSP => ocsp.push(uri.to_string()),
                        _ => {}
                    }
                }
            }
        }
    }

    (ca_issuers, ocsp)
}

/// Convert signature algorithm OID to its conventional name
fn signature_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.4" => "md5WithRSAEncryption",
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption",
        "1.2.840.113549.1.1.10" => "RSASSA-PSS",
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption",
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption",
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption",
        "1.2.840.113549.1.1.14" => "sha224WithRSAEncryption",
        "1.2.840.10045.4.1" => "ecdsa-with-SHA1",
        "1.2.840.10045.4.3.1" => "ecdsa-with-SHA224",
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256",
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384",
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512",
        "1.2.840.10040.4.3" => "dsa-with-sha1",
        "2.16.840.1.101.3.4.3.2" => "dsa-with-sha256",
        "1.3.101.112" => "ed25519",
        "1.3.101.113" => "ed448",
        other => return other.to_string(),
    }
    .to_string()
}

fn extended_key_usage_name(oid: &str) -> String {
    match oid {
        "1.3.6.1.5.5.7.3.1" => "serverAuth",
        "1.3.6.1.5.5.7.3.2" => "clientAuth",
        "1.3.6.1.5.5.7.3.3" => "codeSigning",
        "1.3.6.1.5.5.7.3.4" => "emailProtection",
        "1.3.6.1.5.5.7.3.8" => "timeStamping",
        "1.3.6.1.5.5.7.3.9" => "OCSPSigning",
        "2.5.29.37.0" => "anyExtendedKeyUsage",
        "1.3.6.1.4.1.311.20.2.2" => "smartcardLogon",
        "1.3.6.1.5.2.3.5" => "kerberosPKINITKDC",
        other => return other.to_string(),
    }
    .to_string()
}

fn asn1_time_to_datetime(time: ASN1Time) -> Result<DateTime<Utc>, CertificateError> {
    let timestamp = time.timestamp();
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| CertificateError::decode("invalid timestamp in certificate"))
}

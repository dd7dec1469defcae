//! Report content and renderers
//!
//! A [`ReportDocument`] collects what a finished validation produced. The
//! renderers turn it into bytes; which format is up to the caller.

use crate::certificate::CertificateInfo;
use crate::models::{CertKeyReport, ChainReport, OverallStatus, UrlReport, ValidationResult};
use crate::utils::ReportError;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::fmt::Write as _;

/// Number of SANs listed before the remainder is summarized
const SAN_DISPLAY_LIMIT: usize = 5;

/// Structured report content, independent of output format
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// The certificate the report is about (the leaf, where one exists)
    pub certificate: Option<CertificateInfo>,
    pub chain: Vec<CertificateInfo>,
    /// Chain-file reports only: the certificates in the order they were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplied_order: Option<Vec<CertificateInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_order_correct: Option<bool>,
    pub validation_results: Vec<ValidationResult>,
    pub overall_status: OverallStatus,
}

impl ReportDocument {
    pub fn from_cert_key(report: &CertKeyReport) -> Self {
        Self {
            title: "Certificate Validation Report".to_string(),
            generated_at: Utc::now(),
            certificate: Some(report.cert_info.clone()),
            chain: report.chain_info.clone(),
            supplied_order: None,
            is_order_correct: None,
            validation_results: report.validation_results.clone(),
            overall_status: report.overall_status,
        }
    }

    pub fn from_url(report: &UrlReport, port: u16) -> Self {
        Self {
            title: format!(
                "Certificate Report for {}:{}",
                report.resolved_hostname, port
            ),
            generated_at: Utc::now(),
            certificate: Some(report.cert_info.clone()),
            chain: report.chain_info.clone(),
            supplied_order: None,
            is_order_correct: None,
            validation_results: report.validation_results.clone(),
            overall_status: report.overall_status,
        }
    }

    pub fn from_chain(report: &ChainReport) -> Self {
        let chain: Vec<CertificateInfo> = report
            .canonical_chain
            .iter()
            .map(crate::certificate::extract_info)
            .collect();

        Self {
            title: "Certificate Chain Analysis".to_string(),
            generated_at: Utc::now(),
            certificate: chain.first().cloned(),
            chain,
            supplied_order: Some(report.certs_info.clone()),
            is_order_correct: Some(report.is_order_correct),
            validation_results: report.validation_results.clone(),
            overall_status: report.overall_status,
        }
    }
}

/// Turns a report document into bytes of some format
pub trait ReportRenderer {
    /// File extension of the produced format, without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportError>;
}

/// Pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec_pretty(document).map_err(|e| ReportError::Serialization {
            message: e.to_string(),
        })
    }
}

/// Human-readable plain-text summary
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportError> {
        Ok(render_text(document).into_bytes())
    }
}

fn render_text(doc: &ReportDocument) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", style(&doc.title).bold());
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out);

    match (&doc.supplied_order, doc.is_order_correct) {
        (Some(supplied), Some(is_order_correct)) => {
            write_chain_summary(&mut out, supplied, &doc.chain, is_order_correct)
        }
        _ => {
            if let Some(cert) = &doc.certificate {
                write_certificate_summary(&mut out, cert);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Validation Results:");
    for result in &doc.validation_results {
        let icon = if result.passed {
            style(result.icon()).green()
        } else {
            style(result.icon()).red()
        };
        let _ = writeln!(out, "{} {}: {}", icon, result.check_name, result.message);
    }

    let _ = writeln!(out);
    let status = match doc.overall_status {
        OverallStatus::Success => style(doc.overall_status.as_str()).green(),
        OverallStatus::Warning => style(doc.overall_status.as_str()).yellow(),
        OverallStatus::Error => style(doc.overall_status.as_str()).red(),
    };
    let _ = writeln!(out, "Overall: {}", status.bold());

    out
}

fn write_certificate_summary(out: &mut String, cert: &CertificateInfo) {
    let _ = writeln!(
        out,
        "Subject: {}",
        cert.subject_attr("commonName").unwrap_or("N/A")
    );
    let _ = writeln!(
        out,
        "Issuer: {}",
        cert.issuer_attr("commonName").unwrap_or("N/A")
    );

    if !cert.subject_alt_names.is_empty() {
        let shown: Vec<&str> = cert
            .subject_alt_names
            .iter()
            .take(SAN_DISPLAY_LIMIT)
            .map(String::as_str)
            .collect();
        let _ = writeln!(out, "SANs: {}", shown.join(", "));
        if cert.subject_alt_names.len() > SAN_DISPLAY_LIMIT {
            let _ = writeln!(
                out,
                "      ... and {} more",
                cert.subject_alt_names.len() - SAN_DISPLAY_LIMIT
            );
        }
    }

    let _ = writeln!(out, "Valid From: {}", cert.not_before);
    let _ = writeln!(out, "Valid Until: {}", cert.not_after);
    let _ = writeln!(out, "Serial Number: {}", cert.serial_number);
}

fn write_chain_summary(
    out: &mut String,
    supplied: &[CertificateInfo],
    canonical: &[CertificateInfo],
    is_order_correct: bool,
) {
    let _ = writeln!(out, "Certificates found: {}", supplied.len());
    let _ = writeln!(
        out,
        "Current order: {}",
        if is_order_correct { "CORRECT" } else { "INCORRECT" }
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Current chain order:");
    for (i, cert) in supplied.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({})",
            i + 1,
            cert.subject_attr("commonName").unwrap_or("Unknown"),
            cert_kind(cert)
        );
        let _ = writeln!(
            out,
            "      Issuer: {}",
            cert.issuer_attr("commonName").unwrap_or("Unknown")
        );
    }

    if !is_order_correct {
        let _ = writeln!(out);
        let _ = writeln!(out, "Correct chain order should be:");
        for (i, cert) in canonical.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({})",
                i + 1,
                cert.subject_attr("commonName").unwrap_or("Unknown"),
                cert_kind(cert)
            );
        }
    }
}

fn cert_kind(cert: &CertificateInfo) -> &'static str {
    if cert.is_ca {
        "CA"
    } else {
        "End-entity"
    }
}

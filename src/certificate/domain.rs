//! Hostname matching against certificate names

use crate::certificate::info::Certificate;

/// Outcome of matching a hostname against a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMatch {
    pub matched: bool,
    pub message: String,
}

/// Names the certificate claims: the subject CN first, then DNS SANs
pub fn certificate_domains(cert: &Certificate) -> Vec<String> {
    cert.common_name()
        .into_iter()
        .chain(cert.dns_names())
        .map(str::to_string)
        .collect()
}

/// Check whether `domain` is covered by the certificate's CN or DNS SANs.
///
/// Comparison is case-insensitive. A `*.` wildcard covers exactly one
/// leading label, so `*.example.com` matches `www.example.com` but neither
/// `a.b.example.com` nor `example.com`.
pub fn matches_domain(cert: &Certificate, domain: Option<&str>) -> DomainMatch {
    let domain = match domain.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d,
        None => {
            return DomainMatch {
                matched: true,
                message: "No domain specified for verification".to_string(),
            }
        }
    };

    let candidates = certificate_domains(cert);
    let wanted = domain.to_lowercase();

    for candidate in &candidates {
        let candidate_lower = candidate.to_lowercase();

        if candidate_lower == wanted {
            return DomainMatch {
                matched: true,
                message: format!("Domain '{}' matches certificate", domain),
            };
        }

        if wildcard_matches(&candidate_lower, &wanted) {
            return DomainMatch {
                matched: true,
                message: format!("Domain '{}' matches wildcard certificate", domain),
            };
        }
    }

    DomainMatch {
        matched: false,
        message: format!(
            "Domain '{}' does not match certificate. Certificate domains: {}",
            domain,
            candidates.join(", ")
        ),
    }
}

/// One-label wildcard match; both arguments must already be lowercase
fn wildcard_matches(pattern: &str, domain: &str) -> bool {
    let suffix = match pattern.strip_prefix("*.") {
        Some(s) if !s.is_empty() => s,
        _ => return false,
    };

    match domain.strip_suffix(suffix).and_then(|p| p.strip_suffix('.')) {
        Some(label) => !label.is_empty() && !label.contains('.'),
        None => false,
    }
}

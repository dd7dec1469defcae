//! Chain order resolution
//!
//! Finds the leaf of an unordered certificate set, walks issuer → subject
//! links up to a self-signed root (or until the chain runs out), and
//! reports whether the input already was in that leaf-to-root order.

use crate::certificate::info::Certificate;
use crate::utils::CertificateError;
use std::collections::HashMap;
use tracing::debug;

/// Result of resolving a certificate set into chain order
#[derive(Debug, Clone)]
pub struct ChainOrder {
    /// Whether the input sequence already equals the canonical order
    pub is_ordered: bool,
    /// Leaf first, then each issuer, then any leftover certificates in input order
    pub canonical: Vec<Certificate>,
    /// Number of certificates on the primary leaf-to-root path
    pub path_len: usize,
    pub note: String,
}

impl ChainOrder {
    /// Certificates on the primary leaf-to-root path
    pub fn path(&self) -> &[Certificate] {
        &self.canonical[..self.path_len]
    }

    /// Certificates that did not fit the primary path
    pub fn leftovers(&self) -> &[Certificate] {
        &self.canonical[self.path_len..]
    }

    /// Whether the primary path ends with a self-signed root
    pub fn ends_at_root(&self) -> bool {
        self.path().last().is_some_and(Certificate::is_self_signed)
    }
}

/// Resolve a certificate set into canonical leaf-to-root order.
///
/// Issuer/subject links compare canonical RFC 4514 distinguished names;
/// certificate identity compares DER encodings. When several certificates
/// share the issuer's subject, the first unused one in input order is taken,
/// which keeps resolution idempotent on its own output.
pub fn resolve_order(certificates: &[Certificate]) -> Result<ChainOrder, CertificateError> {
    if certificates.is_empty() {
        return Err(CertificateError::NoCertificates);
    }

    if certificates.len() == 1 {
        return Ok(ChainOrder {
            is_ordered: true,
            canonical: certificates.to_vec(),
            path_len: 1,
            note: "Single certificate (no chain to verify)".to_string(),
        });
    }

    let mut subject_index: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut issuer_index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, cert) in certificates.iter().enumerate() {
        subject_index
            .entry(cert.subject().canonical())
            .or_default()
            .push(i);
        issuer_index
            .entry(cert.issuer().canonical())
            .or_default()
            .push(i);
    }

    // Whether some other certificate in the set names `i` as its issuer
    let issues_another = |i: usize| {
        let cert = &certificates[i];
        issuer_index
            .get(cert.subject().canonical())
            .is_some_and(|issued| issued.iter().any(|&j| certificates[j] != *cert))
    };

    let leaf = match find_leaf(certificates, issues_another) {
        Some(i) => i,
        None => {
            return Ok(ChainOrder {
                is_ordered: false,
                canonical: certificates.to_vec(),
                path_len: 0,
                note: "Could not identify leaf certificate".to_string(),
            })
        }
    };

    let mut used = vec![false; certificates.len()];
    let mut canonical = Vec::with_capacity(certificates.len());
    let mut current = Some(leaf);

    while let Some(i) = current {
        let cert = &certificates[i];
        canonical.push(cert.clone());
        used[i] = true;

        if cert.is_self_signed() {
            break;
        }

        current = subject_index
            .get(cert.issuer().canonical())
            .and_then(|candidates| candidates.iter().copied().find(|&next| !used[next]));
    }

    let path_len = canonical.len();
    for (i, cert) in certificates.iter().enumerate() {
        if !used[i] {
            canonical.push(cert.clone());
        }
    }

    debug!(
        total = certificates.len(),
        path = path_len,
        leftovers = certificates.len() - path_len,
        "Resolved certificate chain order"
    );

    let is_ordered = canonical.len() == certificates.len()
        && canonical.iter().zip(certificates).all(|(a, b)| a == b);

    Ok(ChainOrder {
        is_ordered,
        canonical,
        path_len,
        note: "Chain order verified".to_string(),
    })
}

/// Pick the leaf index.
///
/// Preference: a non-CA certificate that issues nothing else in the set,
/// then any non-CA certificate, then the first certificate in input order.
fn find_leaf(certificates: &[Certificate], issues_another: impl Fn(usize) -> bool) -> Option<usize> {
    let indices = 0..certificates.len();

    indices
        .clone()
        .find(|&i| !certificates[i].is_ca() && !issues_another(i))
        .or_else(|| indices.clone().find(|&i| !certificates[i].is_ca()))
        .or_else(|| indices.clone().next())
}

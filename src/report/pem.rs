//! PEM export functionality
//!
//! Serializes certificates and chains as concatenated `CERTIFICATE` blocks
//! with 64-column base64 lines.

use crate::certificate::Certificate;
use ::pem::{EncodeConfig, LineEnding, Pem};

/// PEM exporter for certificates
pub struct PemExporter;

impl PemExporter {
    /// Export a single certificate to PEM format
    pub fn export_certificate(cert: &Certificate) -> String {
        Self::export_chain(std::slice::from_ref(cert))
    }

    /// Export a certificate chain to PEM format, in the given order
    pub fn export_chain(chain: &[Certificate]) -> String {
        Self::export_chain_internal(chain.iter(), false)
    }

    /// Export the chain minus self-signed roots
    pub fn export_chain_without_roots(chain: &[Certificate]) -> String {
        Self::export_chain_internal(chain.iter(), true)
    }

    fn export_chain_internal<'a>(
        chain: impl Iterator<Item = &'a Certificate>,
        skip_roots: bool,
    ) -> String {
        chain
            .filter(|c| !(skip_roots && c.is_self_signed()))
            .map(|cert| {
                let block = Pem::new("CERTIFICATE", cert.der().to_vec());
                ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
            })
            .collect()
    }
}

//! Live TLS endpoint certificate retrieval
//!
//! Connects to a host, completes a TLS handshake without judging the peer's
//! trust chain, and captures whatever certificates the peer presented. SNI
//! is still sent so virtual hosts serve the right certificate.

use crate::certificate::decoder::decode_one;
use crate::certificate::info::Certificate;
use crate::config::NetworkSettings;
use crate::utils::{InspectorError, NetworkError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Verifier that accepts whatever chain the peer presents.
///
/// The retriever reports on expired, self-signed and misordered chains, so
/// the handshake must complete for exactly the certificates a validating
/// client would reject. Trust is judged afterwards by the validation flows.
#[derive(Debug)]
struct InspectOnlyVerifier {
    schemes: Vec<SignatureScheme>,
}

impl InspectOnlyVerifier {
    fn new() -> Self {
        Self {
            schemes: rustls::crypto::ring::default_provider()
                .signature_verification_algorithms
                .supported_schemes(),
        }
    }
}

impl ServerCertVerifier for InspectOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

/// Certificates captured from a live endpoint
#[derive(Debug, Clone)]
pub struct EndpointCertificates {
    pub leaf: Certificate,
    /// Everything the peer presented, leaf included, in the order it was sent
    pub peer_chain: Vec<Certificate>,
    /// Hostname extracted from the caller's URL
    pub hostname: String,
}

/// Extract the hostname from a URL, bare host, or host with path.
///
/// A missing scheme is treated as `https://`. IPv6 literals are returned
/// without brackets.
pub fn parse_hostname(url: &str) -> Result<String, NetworkError> {
    let trimmed = url.trim();
    let invalid = || NetworkError::InvalidUrl {
        url: url.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = reqwest::Url::parse(&with_scheme).map_err(|_| invalid())?;
    let host = parsed
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .filter(|h| !h.is_empty())
        .ok_or_else(invalid)?;

    Ok(host.to_lowercase())
}

/// Retrieves certificates from TLS endpoints
#[derive(Debug, Clone)]
pub struct EndpointRetriever {
    settings: NetworkSettings,
}

impl EndpointRetriever {
    pub fn new(settings: NetworkSettings) -> Self {
        // reqwest may pull in a second provider; pin ring as the process default
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self { settings }
    }

    /// Connect to `url` on `port` and capture the presented certificates.
    ///
    /// Resolution, connect timeout and connection/handshake failures map to
    /// distinct [`NetworkError`] variants. An undecodable leaf is a decode
    /// error; undecodable chain entries are skipped.
    pub async fn fetch(&self, url: &str, port: u16) -> Result<EndpointCertificates, InspectorError> {
        let hostname = parse_hostname(url)?;
        debug!(host = %hostname, port, "Connecting to endpoint");

        let connect_timeout = self.settings.connect_timeout();
        let addrs: Vec<_> = tokio::time::timeout(
            connect_timeout,
            tokio::net::lookup_host((hostname.as_str(), port)),
        )
        .await
        .map_err(|_| NetworkError::ConnectTimeout {
            host: hostname.clone(),
            port,
        })?
        .map_err(|e| NetworkError::Resolution {
            host: hostname.clone(),
            message: e.to_string(),
        })?
        .collect();

        if addrs.is_empty() {
            return Err(NetworkError::Resolution {
                host: hostname,
                message: "no addresses returned".to_string(),
            }
            .into());
        }

        let connection_error = |message: String| NetworkError::Connection {
            host: hostname.clone(),
            port,
            message,
        };

        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addrs.as_slice()))
            .await
            .map_err(|_| NetworkError::ConnectTimeout {
                host: hostname.clone(),
                port,
            })?
            .map_err(|e| connection_error(e.to_string()))?;

        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InspectOnlyVerifier::new()))
            .with_no_client_auth();
        let connector = tokio_rustls::TlsConnector::from(Arc::new(config));

        let server_name = ServerName::try_from(hostname.clone())
            .map_err(|_| connection_error(format!("Invalid server name: {}", hostname)))?;

        let tls_stream = tokio::time::timeout(
            self.settings.handshake_timeout(),
            connector.connect(server_name, stream),
        )
        .await
        .map_err(|_| NetworkError::ConnectTimeout {
            host: hostname.clone(),
            port,
        })?
        .map_err(|e| connection_error(format!("TLS handshake failed: {}", e)))?;

        let (_, connection) = tls_stream.get_ref();
        let presented = match connection.peer_certificates() {
            Some(certs) if !certs.is_empty() => certs,
            _ => return Err(connection_error("Peer presented no certificates".to_string()).into()),
        };

        let leaf = decode_one(presented[0].as_ref())?;

        let mut peer_chain = Vec::with_capacity(presented.len());
        for (index, der) in presented.iter().enumerate() {
            match decode_one(der.as_ref()) {
                Ok(cert) => peer_chain.push(cert),
                Err(e) => warn!(index, error = %e, "Skipping undecodable peer certificate"),
            }
        }

        debug!(
            host = %hostname,
            presented = presented.len(),
            decoded = peer_chain.len(),
            "Captured peer certificates"
        );

        Ok(EndpointCertificates {
            leaf,
            peer_chain,
            hostname,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hostname_variants() {
        assert_eq!(parse_hostname("example.com").unwrap(), "example.com");
        assert_eq!(parse_hostname("https://Example.COM/path?q=1").unwrap(), "example.com");
        assert_eq!(parse_hostname("example.com:8443/login").unwrap(), "example.com");
        assert_eq!(parse_hostname("http://127.0.0.1:8080").unwrap(), "127.0.0.1");
        assert_eq!(parse_hostname("https://[::1]/").unwrap(), "::1");
    }

    #[test]
    fn test_verifier_offers_provider_schemes() {
        let schemes = InspectOnlyVerifier::new().supported_verify_schemes();
        assert!(schemes.contains(&SignatureScheme::ECDSA_NISTP256_SHA256));
        assert!(schemes.contains(&SignatureScheme::RSA_PSS_SHA256));
        assert!(schemes.contains(&SignatureScheme::ED25519));
    }

    #[test]
    fn test_parse_hostname_rejects_garbage() {
        assert!(matches!(
            parse_hostname(""),
            Err(NetworkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_hostname("https://"),
            Err(NetworkError::InvalidUrl { .. })
        ));
    }
}

//! Network and key checks used by the validation flows

pub mod endpoint;
pub mod key_match;

pub use endpoint::{parse_hostname, EndpointCertificates, EndpointRetriever};
pub use key_match::{
    load_private_key, KeyPairChecker, PairingOutcome, PrivateKeyInfo, SpkiKeyPairChecker,
};

//! Certificate handling module
//!
//! This module provides functionality for:
//! - Decoding PEM/DER certificates and PEM bundles
//! - Extracting certificate metadata
//! - Matching hostnames against certificate names
//! - Resolving chain order
//! - Completing chains via Authority Information Access

pub mod aia;
pub mod decoder;
pub mod domain;
pub mod info;
pub mod name;
pub mod order;

pub use aia::{AiaFetcher, HttpIssuerSource, IssuerSource};
pub use decoder::{decode_many, decode_one};
pub use domain::{certificate_domains, matches_domain, DomainMatch};
pub use info::{extract_info, Certificate, CertificateInfo, KeyUsageFlag, SubjectAltName};
pub use name::{DistinguishedName, NameAttribute};
pub use order::{resolve_order, ChainOrder};

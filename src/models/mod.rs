//! Data models for cert-inspector
//!
//! This module contains the result structures returned by the validation flows.

pub mod report;
pub mod validation;

pub use report::{CertKeyReport, ChainReport, UrlReport};
pub use validation::{OverallStatus, ValidationResult};

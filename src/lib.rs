//! cert-inspector library
//!
//! X.509 certificate inspection providing:
//! - PEM/DER decoding and metadata extraction
//! - Hostname and wildcard matching
//! - Chain order resolution and repair
//! - Missing-intermediate discovery via Authority Information Access
//! - Live TLS endpoint certificate retrieval
//!
//! # Usage
//!
//! ```rust,ignore
//! use cert_inspector::{Inspector, Settings};
//!
//! #[tokio::main]
//! async fn main() -> cert_inspector::Result<()> {
//!     let inspector = Inspector::new(Settings::default())?;
//!     let report = inspector.validate_chain_file(&std::fs::read("chain.pem")?, false)?;
//!     println!("{}", report.overall_status);
//!     Ok(())
//! }
//! ```

pub mod certificate;
pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use certificate::{Certificate, CertificateInfo};
pub use cli::Cli;
pub use config::Settings;
pub use models::{OverallStatus, ValidationResult};
pub use runner::Inspector;
pub use utils::{InspectorError, Result};

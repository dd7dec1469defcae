//! Report generation module
//!
//! PEM chain export plus report documents rendered as JSON or plain text.

pub mod document;
pub mod pem;

pub use document::{JsonRenderer, ReportDocument, ReportRenderer, TextRenderer};
pub use pem::PemExporter;

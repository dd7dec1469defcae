//! Configuration module for cert-inspector
//!
//! Handles loading settings from TOML files.

pub mod settings;

pub use settings::{AiaSettings, InputLimits, NetworkSettings, Settings};

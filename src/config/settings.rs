//! Application settings configuration
//!
//! Defines network timeouts, AIA fetching bounds and input limits.

use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default maximum size of a single input (5 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Live endpoint connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub connect_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            handshake_timeout_secs: 10,
        }
    }
}

impl NetworkSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

/// Authority Information Access fetching settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiaSettings {
    pub fetch_timeout_secs: u64,
    /// Upper bound on issuer downloads for a single certificate
    pub max_hops: usize,
    pub max_response_bytes: usize,
}

impl Default for AiaSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            max_hops: 8,
            max_response_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl AiaSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Limits applied to caller-supplied files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    pub max_input_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            allowed_extensions: [".pem", ".der", ".crt", ".cer", ".key", ".pfx", ".p12"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl InputLimits {
    /// Check whether a file name carries one of the accepted extensions
    pub fn is_allowed_extension(&self, path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
            None => return false,
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub aia: AiaSettings,
    #[serde(default)]
    pub limits: InputLimits,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would disable a timeout or a limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("network.connect_timeout_secs", self.network.connect_timeout_secs as usize),
            ("network.handshake_timeout_secs", self.network.handshake_timeout_secs as usize),
            ("aia.fetch_timeout_secs", self.aia.fetch_timeout_secs as usize),
            ("aia.max_response_bytes", self.aia.max_response_bytes),
            ("limits.max_input_bytes", self.limits.max_input_bytes),
        ];

        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }
}

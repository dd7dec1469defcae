//! Validation result types

use serde::Serialize;

/// Outcome of a single named check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub check_name: String,
    pub passed: bool,
    pub message: String,
}

impl ValidationResult {
    /// Create a passing result
    pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed: true,
            message: message.into(),
        }
    }

    /// Create a failing result
    pub fn fail(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed: false,
            message: message.into(),
        }
    }

    /// Create a result from a boolean outcome
    pub fn from_outcome(check_name: impl Into<String>, passed: bool, message: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            passed,
            message: message.into(),
        }
    }

    /// Get the icon for this result
    pub fn icon(&self) -> &'static str {
        if self.passed {
            "✓"
        } else {
            "✗"
        }
    }
}

/// Overall status derived from a set of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Warning,
    Error,
}

impl OverallStatus {
    /// All passed is success, all failed is error, anything mixed is a warning.
    ///
    /// An empty result set counts as success.
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        if passed == results.len() {
            OverallStatus::Success
        } else if passed == 0 {
            OverallStatus::Error
        } else {
            OverallStatus::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Success => "success",
            OverallStatus::Warning => "warning",
            OverallStatus::Error => "error",
        }
    }

    /// Get the color name for this status
    pub fn color_name(&self) -> &'static str {
        match self {
            OverallStatus::Success => "green",
            OverallStatus::Warning => "yellow",
            OverallStatus::Error => "red",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

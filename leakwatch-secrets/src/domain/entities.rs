//! Secret detection domain entities

use serde::{Deserialize, Serialize};

/// One accepted secret detection with classification metadata.
///
/// The snippet is a truncated copy of the matched text; the cap applies
/// regardless of the match length to limit re-exposure of the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretFinding {
    /// Name of the pattern that produced the match
    pub secret_type: String,
    pub snippet: String,
    pub file_path: String,
    /// 1-based line number
    pub line_number: u32,
    /// Byte offset of the match start within the line
    pub column_start: u32,
    pub column_end: u32,
    /// Shannon entropy of the full matched text, in bits
    pub entropy: f64,
    pub severity: Severity,
    /// Confidence score in [0, 1]
    pub confidence: f64,
}

/// Finding severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

/// Error for unrecognized severity labels
#[derive(Debug, thiserror::Error)]
#[error("Unknown severity '{0}'")]
pub struct UnknownSeverity(pub String);

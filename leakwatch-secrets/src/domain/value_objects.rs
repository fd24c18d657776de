//! Secret detection value objects

use serde::{Deserialize, Serialize};

/// A named detection rule: regex matcher plus an optional entropy gate.
///
/// Patterns are immutable and declared at startup; the name doubles as the
/// identity used for severity-class lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretPattern {
    pub name: String,
    /// Regex source; compiled once when the pattern library is built
    pub pattern: String,
    /// Matches with entropy below this are rejected; `None` means the match
    /// structure alone is conclusive
    pub entropy_threshold: Option<f64>,
    pub description: String,
}

impl SecretPattern {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        entropy_threshold: Option<f64>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            entropy_threshold,
            description: description.into(),
        }
    }
}

/// Entropy calculation utilities
pub struct Entropy;

impl Entropy {
    /// Calculate Shannon entropy for a string.
    ///
    /// Measured in bits over the 256-symbol byte-frequency distribution, so
    /// the result lies in [0.0, 8.0]. The empty string yields 0.0.
    pub fn shannon_entropy(data: &str) -> f64 {
        if data.is_empty() {
            return 0.0;
        }

        let mut frequency = [0u32; 256];
        let len = data.len() as f64;

        for byte in data.bytes() {
            frequency[byte as usize] += 1;
        }

        let mut entropy = 0.0;
        for &count in frequency.iter() {
            if count > 0 {
                let probability = count as f64 / len;
                entropy -= probability * probability.log2();
            }
        }

        entropy
    }
}

//! Severity and confidence classification
//!
//! The policy is plain data injected into the engine, so severity tiers and
//! the pattern-class sets can change without touching detection code.

use crate::domain::entities::Severity;

/// Confidence band offsets relative to a pattern's entropy threshold
const CONFIDENT_MARGIN: f64 = 1.0;
const NEAR_MISS_MARGIN: f64 = 0.5;

/// Classification policy: pattern-class sets plus entropy cutoffs.
///
/// Severity rules are evaluated in order, first match wins:
/// 1. pattern in the critical set
/// 2. pattern in the high set and entropy above the high-pattern floor
/// 3. entropy above the high cutoff
/// 4. entropy above the medium cutoff
/// 5. low
#[derive(Debug, Clone)]
pub struct SeverityPolicy {
    pub critical_patterns: Vec<String>,
    pub high_patterns: Vec<String>,
    pub high_pattern_entropy_floor: f64,
    pub high_entropy_cutoff: f64,
    pub medium_entropy_cutoff: f64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            critical_patterns: vec![
                "AWS Secret Access Key".to_string(),
                "RSA Private Key".to_string(),
                "SSH Private Key".to_string(),
            ],
            high_patterns: vec![
                "AWS Access Key ID".to_string(),
                "GitHub Token".to_string(),
                "Stripe API Key".to_string(),
            ],
            high_pattern_entropy_floor: 4.5,
            high_entropy_cutoff: 5.0,
            medium_entropy_cutoff: 4.0,
        }
    }
}

impl SeverityPolicy {
    /// Severity tier for a match, from pattern identity and entropy
    pub fn severity(&self, pattern_name: &str, entropy: f64) -> Severity {
        if self.critical_patterns.iter().any(|p| p == pattern_name) {
            Severity::Critical
        } else if self.high_patterns.iter().any(|p| p == pattern_name)
            && entropy > self.high_pattern_entropy_floor
        {
            Severity::High
        } else if entropy > self.high_entropy_cutoff {
            Severity::High
        } else if entropy > self.medium_entropy_cutoff {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Confidence score in [0, 1].
    ///
    /// A pattern with no entropy threshold is a structural match and always
    /// scores 1.0. The sub-threshold bands are reachable only when a caller
    /// classifies a match the engine itself would have rejected.
    pub fn confidence(&self, entropy: f64, threshold: Option<f64>) -> f64 {
        let Some(threshold) = threshold else {
            return 1.0;
        };

        if entropy >= threshold + CONFIDENT_MARGIN {
            1.0
        } else if entropy >= threshold {
            0.8
        } else if entropy >= threshold - NEAR_MISS_MARGIN {
            0.6
        } else {
            0.4
        }
    }
}

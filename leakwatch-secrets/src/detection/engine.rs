//! Scan engine
//!
//! Orchestrates the pattern library, false-positive filter, entropy analyzer,
//! and classifier over a text blob. The engine is pure and synchronous; all
//! configuration is injected at construction and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use leakwatch_core::config::DetectionConfig;

use crate::detection::classifier::SeverityPolicy;
use crate::detection::false_positive::FalsePositiveFilter;
use crate::detection::rules::default_patterns;
use crate::domain::entities::SecretFinding;
use crate::domain::value_objects::{Entropy, SecretPattern};

/// File extensions eligible for scanning; extensionless paths always qualify
static SCANNABLE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "py", "js", "ts", "java", "go", "rb", "php", "cs", "cpp", "c", "sh", "bash", "zsh",
        "env", "config", "cfg", "ini", "toml", "yaml", "yml", "json", "xml", "properties",
        "conf", "txt", "md",
    ]
    .into_iter()
    .collect()
});

/// A pattern with its compiled matcher
struct CompiledPattern {
    name: String,
    regex: Regex,
    entropy_threshold: Option<f64>,
}

/// Detection engine over arbitrary text.
///
/// `scan` never fails: the worst case for any input is zero findings.
pub struct ScanEngine {
    patterns: Vec<CompiledPattern>,
    filter: FalsePositiveFilter,
    policy: SeverityPolicy,
    max_line_length: usize,
    snippet_max_chars: usize,
}

impl ScanEngine {
    /// Build an engine from an explicit pattern set, filter, and policy.
    ///
    /// Patterns that fail to compile are skipped with a warning rather than
    /// failing construction.
    pub fn new(
        patterns: Vec<SecretPattern>,
        filter: FalsePositiveFilter,
        policy: SeverityPolicy,
        detection: &DetectionConfig,
    ) -> Self {
        let compiled = patterns
            .into_iter()
            .filter_map(|p| match Regex::new(&p.pattern) {
                Ok(regex) => Some(CompiledPattern {
                    name: p.name,
                    regex,
                    entropy_threshold: p.entropy_threshold,
                }),
                Err(e) => {
                    warn!(pattern = %p.name, error = %e, "Failed to compile pattern; skipping");
                    None
                }
            })
            .collect();

        Self {
            patterns: compiled,
            filter,
            policy,
            max_line_length: detection.max_line_length,
            snippet_max_chars: detection.snippet_max_chars,
        }
    }

    /// Engine with the default pattern library, markers, and policy
    pub fn with_defaults() -> Self {
        Self::with_config(&DetectionConfig::default())
    }

    /// Default library and policy with injected limits
    pub fn with_config(detection: &DetectionConfig) -> Self {
        Self::new(
            default_patterns(),
            FalsePositiveFilter::default(),
            SeverityPolicy::default(),
            detection,
        )
    }

    /// Scan a text blob, reporting findings in line order then pattern
    /// declaration order.
    ///
    /// Lines keep 1-based numbering. Lines beyond the configured length bound
    /// are skipped entirely. Distinct patterns may report overlapping or
    /// identical ranges; they are not deduplicated.
    pub fn scan(&self, content: &str, source: &str) -> Vec<SecretFinding> {
        let mut findings = Vec::new();

        for (line_idx, line) in content.lines().enumerate() {
            let line_number = (line_idx + 1) as u32;

            // Anti-abuse bound for minified or binary-like content
            if line.len() > self.max_line_length {
                debug!(
                    source = %source,
                    line = line_number,
                    length = line.len(),
                    "Skipping over-long line"
                );
                continue;
            }

            for pattern in &self.patterns {
                for m in pattern.regex.find_iter(line) {
                    let matched = m.as_str();

                    if self.filter.is_false_positive(matched) {
                        debug!(
                            pattern = %pattern.name,
                            line = line_number,
                            "Discarding placeholder-like match"
                        );
                        continue;
                    }

                    let entropy = Entropy::shannon_entropy(matched);
                    if let Some(threshold) = pattern.entropy_threshold {
                        if entropy < threshold {
                            debug!(
                                pattern = %pattern.name,
                                line = line_number,
                                entropy,
                                threshold,
                                "Discarding low-entropy match"
                            );
                            continue;
                        }
                    }

                    let severity = self.policy.severity(&pattern.name, entropy);
                    let confidence = self.policy.confidence(entropy, pattern.entropy_threshold);

                    debug!(
                        pattern = %pattern.name,
                        source = %source,
                        line = line_number,
                        entropy,
                        "Secret detected"
                    );

                    findings.push(SecretFinding {
                        secret_type: pattern.name.clone(),
                        snippet: truncate_chars(matched, self.snippet_max_chars),
                        file_path: source.to_string(),
                        line_number,
                        column_start: m.start() as u32,
                        column_end: m.end() as u32,
                        entropy,
                        severity,
                        confidence,
                    });
                }
            }
        }

        findings
    }

    /// Whether a path is worth fetching at all: allow-listed extension
    /// (case-insensitive) or no extension.
    pub fn should_scan(&self, path: &str) -> bool {
        match Path::new(path).extension() {
            None => true,
            Some(ext) => ext
                .to_str()
                .map(|e| SCANNABLE_EXTENSIONS.contains(e.to_ascii_lowercase().as_str()))
                .unwrap_or(false),
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

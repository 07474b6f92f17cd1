//! Issue-based linting score.
//!
//! A specification starts at 100 and loses points for every issue, weighted
//! by severity. The deduction is normalized by the number of rules that could
//! have fired, so a handful of warnings against a large ruleset costs less
//! than the same warnings against a small one.

use super::grades::clamp_score;
use crate::model::{Issue, Severity};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Deduction weight per issue severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeverityWeights {
    pub error: f64,
    pub warn: f64,
    pub info: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            error: 3.0,
            warn: 1.0,
            info: 0.2,
        }
    }
}

impl SeverityWeights {
    #[must_use]
    pub const fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Error => self.error,
            Severity::Warn => self.warn,
            Severity::Info => self.info,
        }
    }

    /// Largest deduction a single rule can cause
    #[must_use]
    pub const fn max_per_rule(&self) -> f64 {
        self.error
    }

    /// Sum of the weights of all issues
    pub fn deduction<'a>(&self, issues: impl IntoIterator<Item = &'a Issue>) -> f64 {
        issues
            .into_iter()
            .map(|issue| self.weight(issue.severity))
            .sum()
    }
}

/// Score issues against the number of applicable rules with default weights
#[must_use]
pub fn score_linting(issues: &[Issue], total_rules: u32) -> f64 {
    score_linting_with(issues, total_rules, &SeverityWeights::default())
}

/// Score issues against the number of applicable rules.
///
/// With no applicable rules the result is 100 for a clean run; issues found
/// anyway are scored as if one rule applied.
#[must_use]
pub fn score_linting_with(issues: &[Issue], total_rules: u32, weights: &SeverityWeights) -> f64 {
    if issues.is_empty() {
        return 100.0;
    }

    let total = f64::from(total_rules.max(1));
    let max_deduction = total * weights.max_per_rule();
    if max_deduction <= 0.0 {
        return 100.0;
    }

    let deduction = weights.deduction(issues);
    clamp_score(100.0 - 100.0 * deduction / max_deduction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IssueSource;

    fn issues(severity: Severity, count: usize) -> Vec<Issue> {
        (0..count)
            .map(|i| {
                Issue::new(
                    "openapi.yml",
                    format!("rule-{i}"),
                    "violation",
                    severity,
                    IssueSource::Spectral,
                )
            })
            .collect()
    }

    #[test]
    fn test_clean_run_scores_100() {
        assert_eq!(score_linting(&[], 42), 100.0);
        assert_eq!(score_linting(&[], 0), 100.0);
    }

    #[test]
    fn test_single_error_single_rule_scores_0() {
        assert_eq!(score_linting(&issues(Severity::Error, 1), 1), 0.0);
    }

    #[test]
    fn test_zero_rules_with_issues_uses_one() {
        assert_eq!(
            score_linting(&issues(Severity::Warn, 1), 0),
            score_linting(&issues(Severity::Warn, 1), 1)
        );
    }

    #[test]
    fn test_known_values() {
        // 2 warnings over 10 rules: 100 - 100 * 2 / 30
        let score = score_linting(&issues(Severity::Warn, 2), 10);
        assert!((score - 93.333_333).abs() < 0.001);

        // 5 info over 1 rule: 100 - 100 * 1.0 / 3
        let score = score_linting(&issues(Severity::Info, 5), 1);
        assert!((score - 66.666_666).abs() < 0.001);
    }

    #[test]
    fn test_score_never_negative() {
        assert_eq!(score_linting(&issues(Severity::Error, 500), 3), 0.0);
    }

    #[test]
    fn test_severity_ordering_reflected() {
        let error = score_linting(&issues(Severity::Error, 1), 10);
        let warn = score_linting(&issues(Severity::Warn, 1), 10);
        let info = score_linting(&issues(Severity::Info, 1), 10);
        assert!(error < warn);
        assert!(warn < info);
    }

    #[test]
    fn test_custom_weights() {
        let weights = SeverityWeights {
            error: 10.0,
            warn: 5.0,
            info: 0.0,
        };
        assert_eq!(
            score_linting_with(&issues(Severity::Info, 9), 2, &weights),
            100.0
        );
        assert_eq!(
            score_linting_with(&issues(Severity::Warn, 1), 1, &weights),
            50.0
        );
    }
}

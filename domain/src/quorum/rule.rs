//! Minimum-quorum policy
//!
//! A [`QuorumRule`] decides the smallest `quorum_count` a request may ask for
//! given its `perspective_count`. The upper bound is always
//! `perspective_count`: a quorum larger than the number of perspectives can
//! never be reached.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Deployment policy for the minimum acceptable quorum
///
/// - `BaselineRequirements`: tolerate one dissenting perspective up to five
///   perspectives, two from six upwards (default)
/// - `Majority`: more than half must pass
/// - `Unanimous`: every perspective must pass
/// - `AtLeast(n)`: at least n perspectives must pass
/// - `Percentage(p)`: at least p% must pass
///
/// # Example
///
/// ```
/// use mpic_domain::QuorumRule;
///
/// let rule = QuorumRule::BaselineRequirements;
/// assert_eq!(rule.min_approvals_needed(3), 2);
/// assert!(rule.accepts(2, 3));
/// assert!(!rule.accepts(5, 3)); // quorum larger than perspective count
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuorumRule {
    /// n-1 for n <= 5, n-2 for n >= 6
    #[default]
    BaselineRequirements,

    /// More than half must pass (n/2 + 1)
    Majority,

    /// All perspectives must pass
    Unanimous,

    /// At least n perspectives must pass
    AtLeast(usize),

    /// At least this percentage must pass (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Check if the rule is satisfied given pass count and total perspectives
    pub fn is_satisfied(&self, passes: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        passes >= self.min_approvals_needed(total)
    }

    /// Minimum passes this rule demands for `total` perspectives
    pub fn min_approvals_needed(&self, total: usize) -> usize {
        let needed = match self {
            QuorumRule::BaselineRequirements => {
                if total <= 5 {
                    total.saturating_sub(1)
                } else {
                    total - 2
                }
            }
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        };
        needed.max(1)
    }

    /// Whether a requested `quorum_count` is legal for `perspective_count`
    pub fn accepts(&self, quorum_count: usize, perspective_count: usize) -> bool {
        quorum_count >= 1
            && quorum_count <= perspective_count
            && quorum_count >= self.min_approvals_needed(perspective_count)
    }

    /// Quorum used when a request does not specify one
    ///
    /// Returns `None` when the rule cannot be met at all (e.g. `AtLeast(5)`
    /// with three perspectives).
    pub fn default_quorum(&self, perspective_count: usize) -> Option<usize> {
        let needed = self.min_approvals_needed(perspective_count);
        (needed <= perspective_count).then_some(needed)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::BaselineRequirements => {
                "baseline requirements (n-1 up to 5, n-2 from 6)".to_string()
            }
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must pass)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} passes", n),
            QuorumRule::Percentage(p) => format!("at least {}% passing", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidQuorumRule(s.to_string());
        match s.to_lowercase().as_str() {
            "baseline" | "baseline_requirements" | "br" => Ok(QuorumRule::BaselineRequirements),
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(invalid)?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| invalid())?;
                if p > 100 {
                    return Err(invalid());
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_rule() {
        let rule = QuorumRule::BaselineRequirements;

        assert_eq!(rule.min_approvals_needed(2), 1);
        assert_eq!(rule.min_approvals_needed(3), 2);
        assert_eq!(rule.min_approvals_needed(5), 4);
        assert_eq!(rule.min_approvals_needed(6), 4);
        assert_eq!(rule.min_approvals_needed(10), 8);
    }

    #[test]
    fn test_accepts_range() {
        let rule = QuorumRule::BaselineRequirements;

        assert!(rule.accepts(2, 3));
        assert!(rule.accepts(3, 3));
        assert!(!rule.accepts(1, 3));
        assert!(!rule.accepts(5, 3));
        assert!(!rule.accepts(0, 3));
    }

    #[test]
    fn test_majority_rule() {
        let rule = QuorumRule::Majority;

        assert!(!rule.is_satisfied(1, 3));
        assert!(rule.is_satisfied(2, 3));
        assert!(!rule.is_satisfied(2, 4));
        assert!(rule.is_satisfied(3, 4));
    }

    #[test]
    fn test_unanimous_rule() {
        let rule = QuorumRule::Unanimous;

        assert!(!rule.is_satisfied(2, 3));
        assert!(rule.is_satisfied(3, 3));
        assert!(!rule.accepts(2, 3));
    }

    #[test]
    fn test_at_least_rule() {
        let rule = QuorumRule::AtLeast(2);

        assert!(!rule.is_satisfied(1, 5));
        assert!(rule.is_satisfied(2, 5));
        assert_eq!(QuorumRule::AtLeast(5).default_quorum(3), None);
        assert_eq!(QuorumRule::AtLeast(2).default_quorum(3), Some(2));
    }

    #[test]
    fn test_percentage_rule() {
        let rule = QuorumRule::Percentage(75);

        // 5 total: need 75% = ceil(3.75) = 4
        assert!(!rule.is_satisfied(3, 5));
        assert!(rule.is_satisfied(4, 5));
    }

    #[test]
    fn test_zero_total() {
        assert!(!QuorumRule::BaselineRequirements.is_satisfied(0, 0));
        assert!(!QuorumRule::Majority.is_satisfied(0, 0));
        assert!(!QuorumRule::AtLeast(1).is_satisfied(0, 0));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            "baseline".parse::<QuorumRule>().ok(),
            Some(QuorumRule::BaselineRequirements)
        );
        assert_eq!(
            "majority".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Majority)
        );
        assert_eq!(
            "atleast:2".parse::<QuorumRule>().ok(),
            Some(QuorumRule::AtLeast(2))
        );
        assert_eq!(
            "80%".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(80))
        );
        assert!("150%".parse::<QuorumRule>().is_err());
        assert!("plurality".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(QuorumRule::default(), QuorumRule::BaselineRequirements);
    }
}

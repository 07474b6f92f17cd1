//! Letter ratings derived from numeric scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter rating of a dimension or an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Rating {
    /// Excellent: 90-100
    A,
    /// Good: 75-89
    B,
    /// Needs improvement: 60-74
    C,
    /// Poor: <60
    D,
    /// Dimension was not evaluated
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Rating {
    /// Rating for a score; scores outside 0-100 are clamped first
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 90.0 {
            Self::A
        } else if score >= 75.0 {
            Self::B
        } else if score >= 60.0 {
            Self::C
        } else {
            Self::D
        }
    }

    #[must_use]
    pub const fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::NotApplicable => "N/A",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "Needs Improvement",
            Self::D => "Poor",
            Self::NotApplicable => "Not Applicable",
        }
    }

    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Rating plus its human-readable description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingInfo {
    pub rating: Rating,
    pub description: &'static str,
}

impl RatingInfo {
    #[must_use]
    pub const fn not_applicable() -> Self {
        Self {
            rating: Rating::NotApplicable,
            description: Rating::NotApplicable.description(),
        }
    }
}

impl From<Rating> for RatingInfo {
    fn from(rating: Rating) -> Self {
        Self {
            rating,
            description: rating.description(),
        }
    }
}

/// Map a score to its rating. Defined for every input, NaN included.
#[must_use]
pub fn calculate_rating(score: f64) -> RatingInfo {
    Rating::from_score(score).into()
}

/// Clamp a score to 0-100, mapping NaN to 0
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(Rating::from_score(100.0), Rating::A);
        assert_eq!(Rating::from_score(90.0), Rating::A);
        assert_eq!(Rating::from_score(89.99), Rating::B);
        assert_eq!(Rating::from_score(75.0), Rating::B);
        assert_eq!(Rating::from_score(74.9), Rating::C);
        assert_eq!(Rating::from_score(60.0), Rating::C);
        assert_eq!(Rating::from_score(59.9), Rating::D);
        assert_eq!(Rating::from_score(0.0), Rating::D);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        assert_eq!(Rating::from_score(140.0), Rating::A);
        assert_eq!(Rating::from_score(-3.0), Rating::D);
        assert_eq!(Rating::from_score(f64::NAN), Rating::D);
        assert_eq!(Rating::from_score(f64::INFINITY), Rating::A);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(calculate_rating(95.0).description, "Excellent");
        assert_eq!(calculate_rating(80.0).description, "Good");
        assert_eq!(calculate_rating(65.0).description, "Needs Improvement");
        assert_eq!(calculate_rating(10.0).description, "Poor");
        assert_eq!(RatingInfo::not_applicable().description, "Not Applicable");
    }

    #[test]
    fn test_not_applicable_serializes_as_slash() {
        let json = serde_json::to_string(&Rating::NotApplicable).expect("serialize");
        assert_eq!(json, "\"N/A\"");
        assert!(!Rating::NotApplicable.is_applicable());
    }
}

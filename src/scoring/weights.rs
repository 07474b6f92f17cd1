//! Dimension weights and the weighted overall score.

use super::grades::clamp_score;
use crate::model::{Dimension, Protocol};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weight of each dimension in the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionWeights {
    pub design: f64,
    #[serde(default)]
    pub security: f64,
    pub documentation: f64,
}

impl DimensionWeights {
    /// Weights used when the protocol supports security scoring
    #[must_use]
    pub const fn with_security() -> Self {
        Self {
            design: 0.5,
            security: 0.3,
            documentation: 0.2,
        }
    }

    /// Weights used when security is held at a neutral 100
    #[must_use]
    pub const fn without_security() -> Self {
        Self {
            design: 0.8,
            security: 0.0,
            documentation: 0.2,
        }
    }

    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Design => self.design,
            Dimension::Security => self.security,
            Dimension::Documentation => self.documentation,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.design + self.security + self.documentation
    }

    /// Scale the weights of the available dimensions so they sum to 1.0.
    ///
    /// Unavailable dimensions get weight 0. Returns all zeros when no
    /// available dimension carries weight.
    #[must_use]
    pub fn renormalize(&self, available: &[Dimension]) -> [(Dimension, f64); 3] {
        let total_available: f64 = Dimension::ALL
            .iter()
            .filter(|d| available.contains(d))
            .map(|d| self.get(*d))
            .sum();

        Dimension::ALL.map(|d| {
            let weight = if total_available > 0.0 && available.contains(&d) {
                self.get(d) / total_available
            } else {
                0.0
            };
            (d, weight)
        })
    }
}

/// Both weight sets, keyed by whether security is scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WeightTable {
    pub with_security: DimensionWeights,
    pub without_security: DimensionWeights,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            with_security: DimensionWeights::with_security(),
            without_security: DimensionWeights::without_security(),
        }
    }
}

impl WeightTable {
    #[must_use]
    pub const fn for_protocol(&self, protocol: Protocol) -> &DimensionWeights {
        if protocol.scores_security() {
            &self.with_security
        } else {
            &self.without_security
        }
    }
}

/// Weighted mean of `(score, dimension)` pairs.
///
/// Only the listed dimensions take part; their weights are renormalized.
/// When none of them carries weight the plain mean is used, and an empty list
/// scores 0.
#[must_use]
pub fn calculate_average_score(scored: &[(f64, Dimension)], weights: &DimensionWeights) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }

    let dimensions: Vec<Dimension> = scored.iter().map(|(_, d)| *d).collect();
    let norm = weights.renormalize(&dimensions);
    let total_weight: f64 = norm.iter().map(|(_, w)| w).sum();

    if total_weight <= 0.0 {
        let sum: f64 = scored.iter().map(|(s, _)| clamp_score(*s)).sum();
        return sum / scored.len() as f64;
    }

    let weighted: f64 = scored
        .iter()
        .map(|(score, dimension)| {
            let weight = norm
                .iter()
                .find(|(d, _)| d == dimension)
                .map_or(0.0, |(_, w)| *w);
            clamp_score(*score) * weight
        })
        .sum();

    clamp_score(weighted)
}

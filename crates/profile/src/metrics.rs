use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::profile::FeatureProfile;

/// Scalar quality metrics recomputed from a profile.
///
/// These are pure functions of the profile's current vectors, not stored
/// state; breeding recomputes them for every offspring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetrics {
    /// Weighted element complexity: mean of the structural complexity
    /// sub-feature and the textural layer/effect loads.
    pub complexity: f64,

    /// How much the profile's traits are spread out: mean per-category
    /// value spread (max - min) over populated categories.
    pub uniqueness: f64,

    /// How evenly expressed the categories are: one minus the mean absolute
    /// deviation of category means from their overall mean.
    pub coherence: f64,
}

impl ProfileMetrics {
    /// Recompute all three metrics from a profile. An empty profile scores
    /// zero complexity/uniqueness and full coherence.
    #[must_use]
    pub fn from_profile(profile: &FeatureProfile) -> Self {
        let structural = profile
            .category(Category::Structural)
            .and_then(|v| v.get(3).copied())
            .unwrap_or(0.0);
        let textural = profile.category(Category::Textural);
        let layer_load = textural.and_then(|v| v.first().copied()).unwrap_or(0.0);
        let effect_load = textural.and_then(|v| v.get(1).copied()).unwrap_or(0.0);
        let complexity = (structural + layer_load + effect_load) / 3.0;

        let mut spreads = Vec::new();
        let mut means = Vec::new();
        for (_, values) in profile.iter() {
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if values.is_empty() {
                continue;
            }
            spreads.push(hi - lo);
            means.push(values.iter().sum::<f64>() / values.len() as f64);
        }

        let uniqueness = if spreads.is_empty() {
            0.0
        } else {
            spreads.iter().sum::<f64>() / spreads.len() as f64
        };

        let coherence = if means.is_empty() {
            1.0
        } else {
            let grand = means.iter().sum::<f64>() / means.len() as f64;
            let deviation =
                means.iter().map(|m| (m - grand).abs()).sum::<f64>() / means.len() as f64;
            (1.0 - deviation).clamp(0.0, 1.0)
        };

        Self {
            complexity: complexity.clamp(0.0, 1.0),
            uniqueness: uniqueness.clamp(0.0, 1.0),
            coherence,
        }
    }
}

use std::sync::Mutex;
use std::sync::PoisonError;

use serde::{Deserialize, Serialize};

use breeder_mutation::MutationEngine;
use breeder_profile::{Category, FeatureProfile, ProfileMetrics, CATEGORY_COUNT};
use breeder_signature::category_similarity;

use crate::error::{BreedError, Result};

/// Policy for combining two parents' category vectors into an offspring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverStrategy {
    /// Winner-take-all per category: the more strongly expressed parent
    /// contributes its whole vector.
    Dominant,
    /// Element-wise average of both parents.
    Balanced,
    /// Average compatible categories (>= 0.5), dominant pick otherwise.
    Hybrid,
    /// Per-category choice between balanced and dominant, cut at 0.6.
    #[default]
    Adaptive,
}

impl CrossoverStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dominant => "dominant",
            Self::Balanced => "balanced",
            Self::Hybrid => "hybrid",
            Self::Adaptive => "adaptive",
        }
    }
}

/// Cross-profile compatibility: overall score plus per-category breakdown.
/// Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Weighted average over the six categories, in [0, 1].
    pub overall: f64,

    /// Per-category sub-scores in comparator order. Categories missing
    /// from either parent sit at the neutral 0.5 default.
    pub per_category: [f64; CATEGORY_COUNT],
}

impl Compatibility {
    /// Sub-score for one category.
    #[must_use]
    pub const fn category(&self, category: Category) -> f64 {
        self.per_category[category.index()]
    }
}

/// Result of one breeding: the offspring profile plus recomputed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offspring {
    pub profile: FeatureProfile,
    pub compatibility: Compatibility,

    /// Complexity/uniqueness/coherence recomputed from the offspring's own
    /// profile after the novelty pass.
    pub metrics: ProfileMetrics,

    pub strategy: CrossoverStrategy,

    /// Estimated fitness: base 0.5, plus 0.2 x compatibility and
    /// 0.1 x trait uniqueness, clamped to [0, 1].
    pub fitness: f64,
}

/// Breeding tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingConfig {
    /// Intensity of the post-crossover novelty jitter. Kept low (at most
    /// 0.3) so offspring stay recognizably related to their parents; zero
    /// disables the pass entirely.
    pub novelty_intensity: f64,

    /// Seed for the novelty generator. `None` seeds from OS entropy.
    pub mutation_seed: Option<u64>,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            novelty_intensity: 0.25,
            mutation_seed: None,
        }
    }
}

/// Combines two feature profiles into offspring profiles.
///
/// Parents are read-only inputs; breeding never mutates them. The only
/// fallible path is total incompatibility (both parents empty).
#[derive(Debug)]
pub struct BreedingEngine {
    config: BreedingConfig,
    mutation: Mutex<MutationEngine>,
}

impl Default for BreedingEngine {
    fn default() -> Self {
        Self::new(BreedingConfig::default())
    }
}

impl BreedingEngine {
    #[must_use]
    pub fn new(config: BreedingConfig) -> Self {
        let novelty_intensity = config.novelty_intensity.clamp(0.0, 0.3);
        let mutation = match config.mutation_seed {
            Some(seed) => MutationEngine::with_seed(seed),
            None => MutationEngine::new(),
        };
        Self {
            config: BreedingConfig {
                novelty_intensity,
                ..config
            },
            mutation: Mutex::new(mutation),
        }
    }

    /// Compatibility between two profiles via the same per-category kernel
    /// the similarity comparator uses. Missing categories default to the
    /// neutral 0.5; only two entirely empty profiles are an error.
    pub fn compatibility(a: &FeatureProfile, b: &FeatureProfile) -> Result<Compatibility> {
        if a.is_empty() && b.is_empty() {
            return Err(BreedError::IncompatibleProfiles);
        }

        let mut per_category = [0.5; CATEGORY_COUNT];
        for category in Category::ALL {
            if let (Some(va), Some(vb)) = (a.category(category), b.category(category)) {
                per_category[category.index()] = category_similarity(va, vb);
            }
        }
        let overall = Category::ALL
            .iter()
            .map(|&c| c.weight() * per_category[c.index()])
            .sum::<f64>()
            .clamp(0.0, 1.0);

        Ok(Compatibility {
            overall,
            per_category,
        })
    }

    /// Produce an offspring profile from two parents.
    ///
    /// Per category the strategy decides how much of each parent the
    /// offspring inherits; categories present in only one parent are taken
    /// whole from that parent. After crossover a single low-intensity
    /// novelty jitter runs and the offspring's metrics are recomputed.
    pub fn breed(
        &self,
        parent_a: &FeatureProfile,
        parent_b: &FeatureProfile,
        strategy: CrossoverStrategy,
    ) -> Result<Offspring> {
        let compatibility = Self::compatibility(parent_a, parent_b)?;
        log::info!(
            "breeding with {} strategy, compatibility {:.3}",
            strategy.as_str(),
            compatibility.overall
        );

        let mut profile = FeatureProfile::empty();
        for category in Category::ALL {
            let inherited = match (parent_a.category(category), parent_b.category(category)) {
                (Some(va), Some(vb)) => Some(crossover(
                    va,
                    vb,
                    strategy,
                    compatibility.category(category),
                )),
                (Some(va), None) => Some(va.to_vec()),
                (None, Some(vb)) => Some(vb.to_vec()),
                (None, None) => None,
            };
            if let Some(values) = inherited {
                profile.set_category(category, values);
            }
        }

        // Innovative mutation pass: one low-intensity jitter for novelty.
        let profile = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .jitter_profile(&profile, self.config.novelty_intensity);

        let metrics = ProfileMetrics::from_profile(&profile);
        let fitness =
            (0.5 + 0.2 * compatibility.overall + 0.1 * metrics.uniqueness).clamp(0.0, 1.0);

        Ok(Offspring {
            profile,
            compatibility,
            metrics,
            strategy,
            fitness,
        })
    }
}

/// Element-wise average, tail compared against zero on length mismatch.
fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let va = a.get(i).copied().unwrap_or(0.0);
            let vb = b.get(i).copied().unwrap_or(0.0);
            (va + vb) / 2.0
        })
        .collect()
}

/// Winner-take-all pick: the parent whose category vector carries the
/// higher mean value (more strongly expressed traits) contributes its whole
/// vector; ties go to parent A.
fn dominant_pick(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mean = |v: &[f64]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().sum::<f64>() / v.len() as f64
        }
    };
    if mean(a) >= mean(b) {
        a.to_vec()
    } else {
        b.to_vec()
    }
}

fn crossover(a: &[f64], b: &[f64], strategy: CrossoverStrategy, compatibility: f64) -> Vec<f64> {
    match strategy {
        CrossoverStrategy::Dominant => dominant_pick(a, b),
        CrossoverStrategy::Balanced => average(a, b),
        CrossoverStrategy::Hybrid => {
            if compatibility >= 0.5 {
                average(a, b)
            } else {
                dominant_pick(a, b)
            }
        }
        CrossoverStrategy::Adaptive => {
            if compatibility > 0.6 {
                average(a, b)
            } else {
                dominant_pick(a, b)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeder_profile::Artifact;
    use pretty_assertions::assert_eq;

    fn profile(content: &str) -> FeatureProfile {
        FeatureProfile::from_artifact(&Artifact::new(content, "parent"))
    }

    fn quiet_engine() -> BreedingEngine {
        BreedingEngine::new(BreedingConfig {
            novelty_intensity: 0.0,
            mutation_seed: Some(3),
        })
    }

    #[test]
    fn self_breed_balanced_reproduces_parent() {
        let parent = profile("stack(\n  sound(\"bd ~ sd hh\").gain(0.8),\n  note(\"c4 e4 g4\").sound(\"sine\")\n)");
        let offspring = quiet_engine()
            .breed(&parent, &parent, CrossoverStrategy::Balanced)
            .unwrap();

        assert_eq!(offspring.profile, parent);
        assert!((offspring.compatibility.overall - 1.0).abs() < 1e-12);
    }

    #[test]
    fn breeding_never_mutates_parents() {
        let a = profile("sound(\"bd bd ~ sd\").gain(0.9)");
        let b = profile("note(\"c4 eb4 g4 bb4\").sound(\"sawtooth\").gain(0.4)");
        let a_before = a.clone();
        let b_before = b.clone();

        let engine = BreedingEngine::default();
        for strategy in [
            CrossoverStrategy::Dominant,
            CrossoverStrategy::Balanced,
            CrossoverStrategy::Hybrid,
            CrossoverStrategy::Adaptive,
        ] {
            engine.breed(&a, &b, strategy).unwrap();
        }

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    fn dominant_takes_whole_category_from_one_parent() {
        let mut a = FeatureProfile::empty();
        let mut b = FeatureProfile::empty();
        a.set_category(Category::Rhythmic, vec![0.9, 0.9, 0.9, 1.0, 1.0]);
        b.set_category(Category::Rhythmic, vec![0.1, 0.1, 0.1, 0.0, 0.0]);

        let offspring = quiet_engine()
            .breed(&a, &b, CrossoverStrategy::Dominant)
            .unwrap();

        assert_eq!(
            offspring.profile.category(Category::Rhythmic),
            a.category(Category::Rhythmic)
        );
    }

    #[test]
    fn missing_category_defaults_to_present_parent() {
        let mut a = FeatureProfile::empty();
        a.set_category(Category::Melodic, vec![0.2, 0.4, 0.6, 0.8]);
        let mut b = FeatureProfile::empty();
        b.set_category(Category::Harmonic, vec![0.3, 0.3, 0.3]);

        let offspring = quiet_engine()
            .breed(&a, &b, CrossoverStrategy::Adaptive)
            .unwrap();

        assert_eq!(
            offspring.profile.category(Category::Melodic),
            a.category(Category::Melodic)
        );
        assert_eq!(
            offspring.profile.category(Category::Harmonic),
            b.category(Category::Harmonic)
        );
        // Categories neither parent has stay neutral in the breakdown and
        // absent from the offspring.
        assert_eq!(offspring.compatibility.category(Category::Timbral), 0.5);
        assert!(offspring.profile.category(Category::Timbral).is_none());
    }

    #[test]
    fn totally_empty_parents_are_incompatible() {
        let result = quiet_engine().breed(
            &FeatureProfile::empty(),
            &FeatureProfile::empty(),
            CrossoverStrategy::Balanced,
        );
        assert_eq!(result.unwrap_err(), BreedError::IncompatibleProfiles);
    }

    #[test]
    fn hybrid_averages_only_compatible_categories() {
        let mut a = FeatureProfile::empty();
        let mut b = FeatureProfile::empty();
        // Compatible category: close vectors, sub-score well above 0.5.
        a.set_category(Category::Melodic, vec![0.4, 0.4, 0.4, 0.4]);
        b.set_category(Category::Melodic, vec![0.6, 0.6, 0.6, 0.6]);
        // Incompatible category: far apart, sub-score below 0.5.
        a.set_category(Category::Rhythmic, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        b.set_category(Category::Rhythmic, vec![0.0, 0.0, 0.0, 0.0, 0.0]);

        let offspring = quiet_engine()
            .breed(&a, &b, CrossoverStrategy::Hybrid)
            .unwrap();

        assert_eq!(
            offspring.profile.category(Category::Melodic),
            Some(&[0.5, 0.5, 0.5, 0.5][..])
        );
        // Dominant pick favors the more expressed parent A.
        assert_eq!(
            offspring.profile.category(Category::Rhythmic),
            a.category(Category::Rhythmic)
        );
    }

    #[test]
    fn fitness_tracks_compatibility() {
        let parent = profile("stack(\n  sound(\"bd ~ sd hh\"),\n  note(\"c4 e4\").sound(\"sine\")\n)");
        let stranger = profile("note(\"[c2,g2] ~ ~ ~\").sound(\"sub\").gain(0.3).slow(4)");

        let engine = quiet_engine();
        let close = engine
            .breed(&parent, &parent, CrossoverStrategy::Adaptive)
            .unwrap();
        let far = engine
            .breed(&parent, &stranger, CrossoverStrategy::Adaptive)
            .unwrap();

        assert!(close.compatibility.overall > far.compatibility.overall);
        // Perfect compatibility puts the base fitness at 0.7 before the
        // uniqueness bonus.
        assert!(close.fitness >= 0.7);
        for offspring in [close, far] {
            assert!((0.0..=1.0).contains(&offspring.fitness));
        }
    }
}

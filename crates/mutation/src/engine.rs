use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use breeder_profile::{Artifact, Category, FeatureProfile, PatternDoc};

use crate::operators::Operator;

/// Intensity used for operators in the standard pass.
pub const STANDARD_INTENSITY: f64 = 0.5;

/// Description tag appended by the standard pass.
const STANDARD_TAG: &str = "(uniquely mutated)";

/// Description tag appended by the aggressive pass.
const AGGRESSIVE_TAG: &str = "(maximally unique variant)";

/// Applies mutation operators to artifacts and novelty jitter to profiles.
///
/// Owns the only random generator in the mutation path; construct it with
/// [`MutationEngine::with_seed`] to replay an exact mutation sequence.
#[derive(Debug)]
pub struct MutationEngine {
    rng: StdRng,
}

impl Default for MutationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationEngine {
    /// Engine seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine with a fixed seed for reproducible mutation sequences.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reset the generator to a known seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Standard pass: 2-3 distinct catalog operators in random order at
    /// moderate intensity. Malformed artifacts pass through unchanged;
    /// the pass never fails.
    pub fn standard_pass(&mut self, artifact: &Artifact) -> Artifact {
        let Some(mut doc) = PatternDoc::parse(&artifact.content) else {
            log::debug!("standard mutation pass skipped: artifact content unparseable");
            return artifact.clone();
        };

        let mut catalog = Operator::CATALOG;
        catalog.shuffle(&mut self.rng);
        let count = self.rng.gen_range(2..=3);
        for operator in &catalog[..count] {
            log::debug!("applying {}", operator.as_str());
            operator.apply(&mut doc, STANDARD_INTENSITY, &mut self.rng);
        }

        artifact.successor(doc.render(), STANDARD_TAG)
    }

    /// Aggressive pass: fixed high-intensity combination ending with novel
    /// element injection. Used when the standard pass was not enough.
    pub fn aggressive_pass(&mut self, artifact: &Artifact) -> Artifact {
        let Some(mut doc) = PatternDoc::parse(&artifact.content) else {
            log::debug!("aggressive mutation pass skipped: artifact content unparseable");
            return artifact.clone();
        };

        log::debug!("applying aggressive mutation combination");
        Operator::RhythmicDisplacement.apply(&mut doc, 0.8, &mut self.rng);
        Operator::HarmonicSubstitution.apply(&mut doc, 0.7, &mut self.rng);
        Operator::TextureModulation.apply(&mut doc, 0.9, &mut self.rng);
        Operator::InjectNovelElement.apply(&mut doc, 1.0, &mut self.rng);

        artifact.successor(doc.render(), AGGRESSIVE_TAG)
    }

    /// Apply an explicit operator sequence (catalog order preserved).
    pub fn apply(
        &mut self,
        artifact: &Artifact,
        operators: &[Operator],
        intensity: f64,
        tag: &str,
    ) -> Artifact {
        let Some(mut doc) = PatternDoc::parse(&artifact.content) else {
            return artifact.clone();
        };
        for operator in operators {
            operator.apply(&mut doc, intensity, &mut self.rng);
        }
        artifact.successor(doc.render(), tag)
    }

    /// Novelty jitter for bred profiles: every populated sub-feature moves
    /// by at most `0.1 * intensity` in either direction, clamped to [0, 1].
    /// Intensity zero returns the profile untouched.
    #[must_use]
    pub fn jitter_profile(&mut self, profile: &FeatureProfile, intensity: f64) -> FeatureProfile {
        let intensity = intensity.clamp(0.0, 1.0);
        let mut jittered = profile.clone();
        for category in Category::ALL {
            let Some(values) = profile.category(category) else {
                continue;
            };
            let values: Vec<f64> = values
                .iter()
                .map(|v| v + (self.rng.gen::<f64>() - 0.5) * 0.2 * intensity)
                .collect();
            jittered.set_category(category, values);
        }
        jittered
    }
}

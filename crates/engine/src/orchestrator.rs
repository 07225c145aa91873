use std::sync::Mutex;
use std::sync::PoisonError;

use serde::{Deserialize, Serialize};

use breeder_mutation::MutationEngine;
use breeder_profile::Artifact;
use breeder_registry::{Admission, FingerprintRegistry, RegistryConfig};
use breeder_signature::extract;

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Similarity above which two patterns are considered too similar.
    pub similarity_threshold: f64,

    /// Fingerprint registry capacity.
    pub registry_capacity: usize,

    /// Seed for the mutation generator. `None` seeds from OS entropy;
    /// set it to replay exact mutation sequences in tests.
    pub mutation_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            registry_capacity: 1000,
            mutation_seed: None,
        }
    }
}

/// Which route a candidate took through the uniqueness state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniquenessPath {
    /// Accepted on first comparison, returned unchanged.
    Original,
    /// Accepted after one standard mutation pass.
    Mutated,
    /// Aggressive pass taken; accepted unconditionally without a third
    /// comparison (bounded-effort policy, uniqueness not re-verified).
    MaximallyUnique,
}

/// Caller-facing trace of one uniqueness check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniquenessReport {
    pub path: UniquenessPath,

    /// Highest registry similarity seen on the first comparison.
    pub first_similarity: f64,

    /// Highest similarity on the second comparison, when one happened.
    pub second_similarity: Option<f64>,
}

/// Drives extract -> compare -> mutate -> re-check, bounded to two
/// comparison rounds.
///
/// States: Draft -> Extracted -> Compared -> {Accepted | Mutating ->
/// Extracted -> Compared -> {Accepted | AggressiveMutating -> Accepted}}.
/// Every terminal state is Accepted: the check never fails a candidate, it
/// only escalates effort.
#[derive(Debug)]
pub struct UniquenessEngine {
    config: EngineConfig,
    registry: FingerprintRegistry,
    mutation: Mutex<MutationEngine>,
}

impl UniquenessEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let registry = FingerprintRegistry::new(RegistryConfig {
            capacity: config.registry_capacity,
        });
        let mutation = match config.mutation_seed {
            Some(seed) => MutationEngine::with_seed(seed),
            None => MutationEngine::new(),
        };
        Self {
            config,
            registry,
            mutation: Mutex::new(mutation),
        }
    }

    /// The registry this engine owns (read access for callers/telemetry).
    #[must_use]
    pub const fn registry(&self) -> &FingerprintRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ensure the candidate is dissimilar from registry history.
    ///
    /// Infallible: always returns an accepted artifact (possibly mutated
    /// and tagged) whose signature has been stored. Work is bounded by two
    /// extraction/comparison rounds plus a fixed number of operator
    /// applications, regardless of registry size.
    pub fn ensure_uniqueness(&self, artifact: Artifact) -> (Artifact, UniquenessReport) {
        log::info!("checking pattern uniqueness");
        let threshold = self.config.similarity_threshold;

        let signature = extract(&artifact);
        match self.registry.try_admit(&signature, threshold) {
            Admission::Admitted { max_similarity } => {
                log::info!("accepted unchanged (similarity {:.3})", max_similarity);
                return (
                    artifact,
                    UniquenessReport {
                        path: UniquenessPath::Original,
                        first_similarity: max_similarity,
                        second_similarity: None,
                    },
                );
            }
            Admission::Rejected { max_similarity } => {
                log::info!(
                    "pattern too similar ({:.3} > {:.3}), applying creative mutations",
                    max_similarity,
                    threshold
                );
                let mutated = self.lock_mutation().standard_pass(&artifact);
                let mutated_signature = extract(&mutated);
                match self.registry.try_admit(&mutated_signature, threshold) {
                    Admission::Admitted {
                        max_similarity: second,
                    } => {
                        log::info!("accepted after standard mutation (similarity {:.3})", second);
                        (
                            mutated,
                            UniquenessReport {
                                path: UniquenessPath::Mutated,
                                first_similarity: max_similarity,
                                second_similarity: Some(second),
                            },
                        )
                    }
                    Admission::Rejected {
                        max_similarity: second,
                    } => {
                        log::info!(
                            "still too similar ({:.3}), applying aggressive mutations",
                            second
                        );
                        // Bounded-effort policy: accept unconditionally after
                        // the aggressive pass, with no third comparison.
                        let variant = self.lock_mutation().aggressive_pass(&mutated);
                        self.registry.insert(extract(&variant));
                        (
                            variant,
                            UniquenessReport {
                                path: UniquenessPath::MaximallyUnique,
                                first_similarity: max_similarity,
                                second_similarity: Some(second),
                            },
                        )
                    }
                }
            }
        }
    }

    fn lock_mutation(&self) -> std::sync::MutexGuard<'_, MutationEngine> {
        self.mutation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Uniqueness orchestration and cross-pattern breeding.
//!
//! Ties the lower crates together into the two caller-facing engines:
//!
//! ```text
//!                       +--------------------+
//!     Artifact -------> | UniquenessEngine   | ----> accepted Artifact
//!                       |  extract           |       + UniquenessReport
//!                       |  compare (registry)|
//!                       |  mutate & re-check |
//!                       +--------------------+
//!
//!                       +--------------------+
//!     FeatureProfile -> | BreedingEngine     | ----> Offspring
//!     FeatureProfile -> |  compatibility     |       (profile, metrics,
//!                       |  crossover         |        fitness)
//!                       |  novelty jitter    |
//!                       +--------------------+
//! ```
//!
//! The uniqueness check is infallible and bounded to two comparison rounds;
//! breeding fails only when both parents are entirely featureless.

mod breeding;
mod error;
mod orchestrator;

pub use breeding::{
    BreedingConfig, BreedingEngine, Compatibility, CrossoverStrategy, Offspring,
};
pub use error::{BreedError, Result};
pub use orchestrator::{EngineConfig, UniquenessEngine, UniquenessPath, UniquenessReport};

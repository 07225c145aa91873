//! # Breeder Mutation
//!
//! Catalog of structural mutation operators over pattern artifacts, plus
//! the engine that applies them.
//!
//! ```text
//! Artifact ──parse──> PatternDoc ──operators──> PatternDoc' ──render──> Artifact'
//! ```
//!
//! Operators are independent and never fail: one that cannot apply (the
//! pattern lacks the structural feature it targets) leaves the document
//! unchanged for that step. All randomness flows through a single seeded
//! generator owned by [`MutationEngine`], so mutation sequences are
//! reproducible from a seed.

mod engine;
mod operators;

pub use engine::{MutationEngine, STANDARD_INTENSITY};
pub use operators::Operator;

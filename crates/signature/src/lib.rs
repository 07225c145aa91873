//! # Breeder Signature
//!
//! Compact, comparable signatures for generated patterns and the weighted
//! similarity comparator.
//!
//! ```text
//! Artifact ──> FeatureProfile ──> Signature
//!                                   │  six normalized stat vectors
//!                                   │  + composite FNV-1a hash
//!                                   │  + low-confidence flag
//!                                   ▼
//!                       similarity(sigA, sigB) ∈ [0, 1]
//! ```
//!
//! `similarity` is reflexive, symmetric and bounded; `gated_similarity`
//! additionally treats any pair involving a low-confidence signature as
//! fully dissimilar so malformed artifacts are never blocked (and never
//! meaningfully deduplicated).

mod extractor;
mod signature;
mod similarity;

pub use extractor::extract;
pub use signature::Signature;
pub use similarity::{category_similarity, gated_similarity, similarity};

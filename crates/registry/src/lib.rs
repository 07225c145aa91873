//! # Breeder Registry
//!
//! Bounded, process-local history of accepted pattern signatures.
//!
//! The registry is the only shared mutable state in the engine. All reads
//! go through a read lock; insertion (and the compare-then-insert unit
//! [`FingerprintRegistry::try_admit`]) takes the write lock, and eviction
//! runs synchronously inside the insert so the capacity invariant holds the
//! moment any insert returns.

mod registry;

pub use registry::{Admission, FingerprintRegistry, RegistryConfig};

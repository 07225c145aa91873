use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use breeder_signature::{gated_similarity, Signature};

/// Registry tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of stored fingerprints. Exceeding it triggers a
    /// synchronous batch eviction of the oldest entries.
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Outcome of the atomic compare-then-insert unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Highest similarity was at or below the threshold; the signature was
    /// inserted.
    Admitted { max_similarity: f64 },
    /// Too similar to an existing fingerprint; nothing was inserted.
    Rejected { max_similarity: f64 },
}

#[derive(Debug)]
struct RegistryEntry {
    signature: Signature,
    inserted_at: SystemTime,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<RegistryEntry>,
    next_seq: u64,
}

/// Bounded history of accepted signatures with oldest-first batch eviction.
///
/// Owned by the engine and passed by reference to callers; lifecycle is
/// explicit construction and drop, never ambient global state. Safe to
/// share across threads: reads take a read lock, inserts the write lock.
#[derive(Debug)]
pub struct FingerprintRegistry {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl FingerprintRegistry {
    /// Create an empty registry. Capacity is clamped to at least one entry.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: config.capacity.max(1),
        }
    }

    /// Highest similarity between `signature` and any stored entry.
    /// An empty registry scores 0.0.
    #[must_use]
    pub fn max_similarity(&self, signature: &Signature) -> f64 {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .iter()
            .map(|entry| gated_similarity(signature, &entry.signature))
            .fold(0.0, f64::max)
    }

    /// Compare-then-insert under a single write lock: inserts and admits
    /// when the highest similarity is at or below `threshold`, otherwise
    /// rejects without touching the history.
    pub fn try_admit(&self, signature: &Signature, threshold: f64) -> Admission {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let max_similarity = inner
            .entries
            .iter()
            .map(|entry| gated_similarity(signature, &entry.signature))
            .fold(0.0, f64::max);
        if max_similarity <= threshold {
            self.push(&mut inner, signature.clone());
            Admission::Admitted { max_similarity }
        } else {
            Admission::Rejected { max_similarity }
        }
    }

    /// Insert unconditionally (used for the final accepted signature after
    /// an escalated mutation pass). Eviction runs inside the same write
    /// lock, so `len() <= capacity` holds the moment this returns.
    pub fn insert(&self, signature: Signature) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        self.push(&mut inner, signature);
    }

    /// Number of stored fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity bound.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a signature with the same composite hash is stored.
    #[must_use]
    pub fn contains(&self, signature: &Signature) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .iter()
            .any(|entry| entry.signature.hash() == signature.hash())
    }

    fn push(&self, inner: &mut Inner, signature: Signature) {
        self.evict_for_insert(inner);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(RegistryEntry {
            signature,
            inserted_at: SystemTime::now(),
            seq,
        });
        if inner.entries.len() > self.capacity {
            // Internal invariant, should be unreachable given the eviction
            // sequencing above.
            log::error!(
                "registry capacity invariant violated: {} > {}",
                inner.entries.len(),
                self.capacity
            );
            debug_assert!(inner.entries.len() <= self.capacity);
        }
    }

    /// Drop the oldest entries (timestamp, ties by insertion order) so the
    /// history sits at 80% of capacity once the incoming entry lands.
    fn evict_for_insert(&self, inner: &mut Inner) {
        if inner.entries.len() + 1 <= self.capacity {
            return;
        }
        let keep_after_insert = self.capacity - self.capacity / 5;
        let excess = (inner.entries.len() + 1)
            .saturating_sub(keep_after_insert)
            .min(inner.entries.len());
        inner
            .entries
            .sort_by_key(|entry| (entry.inserted_at, entry.seq));
        inner.entries.drain(0..excess);
        log::info!(
            "evicted {} oldest fingerprints ({} remain, capacity {})",
            excess,
            inner.entries.len(),
            self.capacity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeder_profile::{Category, FeatureProfile};
    use pretty_assertions::assert_eq;

    /// Distinct signature per index: one hot value scaled into [0, 1].
    fn distinct_signature(i: usize) -> Signature {
        let mut profile = FeatureProfile::empty();
        profile.set_category(
            Category::Rhythmic,
            vec![
                (i % 97) as f64 / 97.0,
                (i / 97 % 97) as f64 / 97.0,
                (i / 9409) as f64 / 97.0,
                1.0,
                0.0,
            ],
        );
        profile.set_category(Category::Melodic, vec![(i % 53) as f64 / 53.0; 4]);
        Signature::from_profile(&profile)
    }

    #[test]
    fn empty_registry_scores_zero() {
        let registry = FingerprintRegistry::new(RegistryConfig::default());
        assert!(registry.is_empty());
        assert_eq!(registry.max_similarity(&distinct_signature(1)), 0.0);
    }

    #[test]
    fn insert_grows_until_capacity() {
        let registry = FingerprintRegistry::new(RegistryConfig { capacity: 10 });
        for i in 0..10 {
            registry.insert(distinct_signature(i));
        }
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn overflow_insert_trims_to_eighty_percent() {
        let registry = FingerprintRegistry::new(RegistryConfig { capacity: 10 });
        for i in 0..11 {
            registry.insert(distinct_signature(i));
        }
        // 11th insert evicts down so the post-insert size is 80% of capacity.
        assert_eq!(registry.len(), 8);
        // Oldest 20% of the pre-overflow entries are gone.
        assert!(!registry.contains(&distinct_signature(0)));
        assert!(!registry.contains(&distinct_signature(1)));
        assert!(registry.contains(&distinct_signature(10)));

        // Then the registry grows by one per insert again.
        registry.insert(distinct_signature(11));
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn thousand_and_one_inserts_trim_to_eight_hundred() {
        let registry = FingerprintRegistry::new(RegistryConfig::default());
        for i in 0..1001 {
            registry.insert(distinct_signature(i));
        }
        assert_eq!(registry.len(), 800);
        assert!(registry.len() <= registry.capacity());
    }

    #[test]
    fn try_admit_is_threshold_gated() {
        let registry = FingerprintRegistry::new(RegistryConfig::default());
        let signature = distinct_signature(42);

        let first = registry.try_admit(&signature, 0.75);
        assert_eq!(first, Admission::Admitted { max_similarity: 0.0 });
        assert_eq!(registry.len(), 1);

        // The identical signature scores 1.0 and is rejected.
        match registry.try_admit(&signature, 0.75) {
            Admission::Rejected { max_similarity } => {
                assert!((max_similarity - 1.0).abs() < 1e-12);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn low_confidence_is_never_blocked() {
        let registry = FingerprintRegistry::new(RegistryConfig::default());
        let zero = Signature::low_confidence();
        registry.insert(zero.clone());
        // A second malformed artifact still admits despite the stored twin.
        match registry.try_admit(&zero, 0.75) {
            Admission::Admitted { max_similarity } => assert_eq!(max_similarity, 0.0),
            other => panic!("expected admission, got {other:?}"),
        }
    }
}

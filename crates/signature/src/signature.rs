use serde::{Deserialize, Serialize};

use breeder_profile::{Category, FeatureProfile, CATEGORY_COUNT};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Immutable per-category summary of a pattern, used for similarity scoring.
///
/// Two artifacts with identical signatures are indistinguishable for
/// comparison purposes. The composite hash is a non-cryptographic checksum
/// over the canonical JSON encoding of the six vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    categories: [Vec<f64>; CATEGORY_COUNT],
    hash: u64,
    low_confidence: bool,
}

impl Signature {
    /// Build a signature from a derived profile. Categories the profile
    /// lacks summarize to all-zero vectors; an entirely empty profile
    /// yields the low-confidence zero signature.
    #[must_use]
    pub fn from_profile(profile: &FeatureProfile) -> Self {
        let mut categories: [Vec<f64>; CATEGORY_COUNT] = Default::default();
        for category in Category::ALL {
            categories[category.index()] = match profile.category(category) {
                Some(values) => values.to_vec(),
                None => vec![0.0; category.dimension()],
            };
        }
        let hash = composite_hash(&categories);
        Self {
            categories,
            hash,
            low_confidence: profile.is_empty(),
        }
    }

    /// The all-zero signature returned for malformed artifacts.
    #[must_use]
    pub fn low_confidence() -> Self {
        Self::from_profile(&FeatureProfile::empty())
    }

    /// Stat vector for one category (always present, zero-filled when the
    /// source profile lacked the category).
    #[must_use]
    pub fn category(&self, category: Category) -> &[f64] {
        &self.categories[category.index()]
    }

    /// Composite hash over the full summary.
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// Whether this signature came from a malformed artifact. Callers treat
    /// low-confidence signatures as always below the uniqueness threshold.
    #[must_use]
    pub const fn is_low_confidence(&self) -> bool {
        self.low_confidence
    }
}

/// FNV-1a over the canonical JSON of the category vectors.
fn composite_hash(categories: &[Vec<f64>; CATEGORY_COUNT]) -> u64 {
    let encoded = serde_json::to_string(categories).unwrap_or_default();
    let mut hash = FNV_OFFSET;
    for byte in encoded.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

use breeder_profile::Category;

use crate::signature::Signature;

/// Per-category sub-score: `1 - mean absolute difference`, clamped.
///
/// Both vectors hold values normalized to `[0, 1]`, so the mean absolute
/// difference is already a bounded distance. Length mismatches (possible
/// with hand-built profiles) compare the missing tail against zero.
#[must_use]
pub fn category_similarity(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().max(b.len());
    if len == 0 {
        return 1.0;
    }
    let total: f64 = (0..len)
        .map(|i| {
            let va = a.get(i).copied().unwrap_or(0.0);
            let vb = b.get(i).copied().unwrap_or(0.0);
            (va - vb).abs()
        })
        .sum();
    (1.0 - total / len as f64).clamp(0.0, 1.0)
}

/// Weighted similarity of two signatures in `[0, 1]`.
///
/// Weighted sum of six per-category sub-scores using the fixed category
/// weights (rhythmic 0.30, melodic 0.25, harmonic 0.20, textural 0.10,
/// structural 0.10, timbral 0.05). Reflexive, symmetric and bounded; no
/// side effects.
#[must_use]
pub fn similarity(a: &Signature, b: &Signature) -> f64 {
    Category::ALL
        .iter()
        .map(|&c| c.weight() * category_similarity(a.category(c), b.category(c)))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Similarity as seen by the uniqueness check: any pair involving a
/// low-confidence signature scores zero, so malformed artifacts are never
/// blocked and never meaningfully deduplicated.
#[must_use]
pub fn gated_similarity(a: &Signature, b: &Signature) -> f64 {
    if a.is_low_confidence() || b.is_low_confidence() {
        0.0
    } else {
        similarity(a, b)
    }
}

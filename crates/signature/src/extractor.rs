use breeder_profile::{Artifact, FeatureProfile};

use crate::signature::Signature;

/// Derive a signature from an artifact.
///
/// Pure and deterministic: the same content always yields a bit-identical
/// signature. Malformed content (empty or unparseable) does not error - it
/// produces the all-zero signature flagged low-confidence.
#[must_use]
pub fn extract(artifact: &Artifact) -> Signature {
    let profile = FeatureProfile::from_artifact(artifact);
    if profile.is_empty() {
        log::debug!("extracting low-confidence signature for malformed artifact");
    }
    Signature::from_profile(&profile)
}

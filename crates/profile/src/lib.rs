//! # Breeder Profile
//!
//! Data model for generated audio-pattern artifacts and their feature
//! profiles ("DNA").
//!
//! ## Architecture
//!
//! ```text
//! Artifact (content + description)
//!     │
//!     ├──> PatternDoc::parse (tolerant mini-notation parser)
//!     │      ├─ Layers: sound("bd ~ sd hh") / note("c4 e4 g4")
//!     │      ├─ Effect chains: .gain(0.7), .lpf(200), ...
//!     │      └─ Outer tempo modifiers: .fast(1.5)
//!     │
//!     ├──> FeatureProfile::from_doc
//!     │      └─ Six categories of normalized scalar sub-features
//!     │         (rhythmic, melodic, harmonic, textural, structural, timbral)
//!     │
//!     └──> ProfileMetrics::from_profile
//!            └─ complexity / uniqueness / coherence scalars
//! ```
//!
//! Everything here is a pure derivation: the same artifact content always
//! yields the same profile, and malformed content degrades to an empty
//! profile instead of an error.

mod artifact;
mod category;
mod metrics;
mod notation;
mod profile;

pub use artifact::Artifact;
pub use category::{Category, CATEGORY_COUNT};
pub use metrics::ProfileMetrics;
pub use notation::{
    is_chord, is_rest, repeat_factor, token_base, Effect, Layer, LayerSource, PatternDoc, Pitch,
};
pub use profile::FeatureProfile;

use serde::{Deserialize, Serialize};

/// Number of feature categories in a profile.
pub const CATEGORY_COUNT: usize = 6;

/// The six feature categories every profile is described in.
///
/// Category weights are global constants of the comparator (they sum to 1.0
/// and are never renormalized per artifact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Rhythmic,
    Melodic,
    Harmonic,
    Textural,
    Structural,
    Timbral,
}

impl Category {
    /// All categories in comparator order.
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::Rhythmic,
        Self::Melodic,
        Self::Harmonic,
        Self::Textural,
        Self::Structural,
        Self::Timbral,
    ];

    /// Fixed comparator weight for this category. Weights sum to 1.0.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Rhythmic => 0.30,
            Self::Melodic => 0.25,
            Self::Harmonic => 0.20,
            Self::Textural => 0.10,
            Self::Structural => 0.10,
            Self::Timbral => 0.05,
        }
    }

    /// Number of scalar sub-features extracted for this category.
    #[must_use]
    pub const fn dimension(self) -> usize {
        match self {
            Self::Rhythmic => 5,
            Self::Melodic => 4,
            Self::Harmonic => 3,
            Self::Textural => 4,
            Self::Structural => 4,
            Self::Timbral => 4,
        }
    }

    /// Position in the profile's category table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Rhythmic => 0,
            Self::Melodic => 1,
            Self::Harmonic => 2,
            Self::Textural => 3,
            Self::Structural => 4,
            Self::Timbral => 5,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rhythmic => "rhythmic",
            Self::Melodic => "melodic",
            Self::Harmonic => "harmonic",
            Self::Textural => "textural",
            Self::Structural => "structural",
            Self::Timbral => "timbral",
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BreedError>;

/// Breeding is the engine's only fallible surface: uniqueness checks never
/// fail, they only escalate effort.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedError {
    /// Both parent profiles lack every feature category, so there is no
    /// genetic material to combine. Partially populated profiles never
    /// trigger this - missing categories fall back to the neutral default.
    #[error("incompatible profiles: both parents lack all feature categories")]
    IncompatibleProfiles,
}

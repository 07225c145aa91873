use serde::{Deserialize, Serialize};

/// A single generated pattern under test for uniqueness.
///
/// Artifacts are immutable once produced: mutation operators build a *new*
/// artifact from a transformed [`crate::PatternDoc`], they never edit one in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    /// Pattern script in the generator's layered mini-notation.
    pub content: String,

    /// Human-readable description of the pattern.
    pub description: String,
}

impl Artifact {
    /// Create a new artifact from its rendered content and description.
    #[must_use]
    pub fn new(content: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            description: description.into(),
        }
    }

    /// Build a successor artifact with new content, appending a tag to the
    /// description so mutation provenance stays visible to the caller.
    #[must_use]
    pub fn successor(&self, content: String, tag: &str) -> Self {
        Self {
            content,
            description: format!("{} {}", self.description, tag),
        }
    }

    /// Whether the artifact carries a description tag (e.g. mutation
    /// annotations like "(maximally unique variant)").
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.description.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_appends_tag() {
        let artifact = Artifact::new("sound(\"bd\")", "four on the floor");
        let next = artifact.successor("sound(\"bd sd\")".to_string(), "(uniquely mutated)");

        assert_eq!(next.content, "sound(\"bd sd\")");
        assert!(next.has_tag("(uniquely mutated)"));
        // Original is untouched.
        assert_eq!(artifact.description, "four on the floor");
    }
}

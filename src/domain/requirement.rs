use std::{fmt, num::NonZeroUsize};

/// The keyword that marks a sentence as a requirement.
pub const KEYWORD: &str = "shall";

/// Returns `true` if `sentence` contains "shall" in any letter case.
///
/// This is a plain substring match. Words which merely contain the keyword
/// ("shallot", "shallow") also qualify.
#[must_use]
pub fn is_requirement(sentence: &str) -> bool {
    sentence.to_lowercase().contains(KEYWORD)
}

/// A requirement sentence together with its position in the compliance matrix.
///
/// IDs start at 1 and are assigned in the order requirements are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementRecord {
    id: NonZeroUsize,
    text: String,
}

impl RequirementRecord {
    /// Creates a record from an already assigned ID.
    #[must_use]
    pub const fn new(id: NonZeroUsize, text: String) -> Self {
        Self { id, text }
    }

    /// The 1-based sequential ID.
    #[must_use]
    pub const fn id(&self) -> NonZeroUsize {
        self.id
    }

    /// The requirement sentence.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RequirementRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.text)
    }
}

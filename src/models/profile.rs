//! Collaborator profile types.

use serde::{Deserialize, Serialize};

/// Permission tier of a collaborator.
///
/// Ordered: `Basic < Intermediate < Superior`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// Read-mostly access.
    #[default]
    Basic,
    /// Can manage boards and tasks.
    Intermediate,
    /// Full administrative access.
    Superior,
}

impl AccessLevel {
    /// Check whether this level grants at least `required`.
    #[must_use]
    pub fn at_least(self, required: AccessLevel) -> bool {
        self >= required
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Superior => write!(f, "superior"),
        }
    }
}

/// The authenticated collaborator's profile, as returned by `/collaborators/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub access_level: AccessLevel,
}

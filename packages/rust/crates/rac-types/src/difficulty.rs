//! Difficulty classification for archived articles.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// How demanding an article is for its reader.
///
/// Parsing never fails and ignores case: anything that is not one of the
/// three known levels becomes [`DifficultyLevel::Unknown`]. Serialized
/// lowercase.
#[derive(Debug, Clone, Copy, Serialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Introductory material
    Beginner,
    /// Assumes working knowledge of the topic
    Intermediate,
    /// Deep dives and expert material
    Advanced,
    /// Not classified
    #[default]
    Unknown,
}

impl DifficultyLevel {
    /// Lowercase name as written to front matter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the level carries a real classification.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::str::FromStr for DifficultyLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Ok(Self::Unknown),
        }
    }
}

impl<'de> Deserialize<'de> for DifficultyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::Unknown, |s| s.parse().unwrap_or_default()))
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

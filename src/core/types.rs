use serde::{Deserialize, Serialize};

/// Reference to a component or release in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryRef(pub String);

impl EntryRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A component: the versionless parent of releases
    Component,
    /// A concrete, versioned release of a component
    #[default]
    Release,
}

/// Outcome of matching a BOM component against the catalog.
///
/// Variants are declared from strongest to weakest evidence, so the derived
/// ordering doubles as the priority: a smaller value always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchCode {
    #[serde(rename = "0-invalid")]
    Invalid,
    #[serde(rename = "1-full-match-by-id")]
    FullById,
    #[serde(rename = "2-full-match-by-hash")]
    FullByHash,
    #[serde(rename = "3-full-match-by-name-and-version")]
    FullByNameVersion,
    #[serde(rename = "4-good-match-by-filename")]
    ByFilename,
    #[serde(rename = "5-candidate-match-by-name")]
    ByName,
    #[serde(rename = "6-candidate-match-similar-component")]
    BySimilarity,
    #[serde(rename = "9-no-match")]
    NoMatch,
}

impl MatchCode {
    /// Every code, strongest first
    pub const ALL: [MatchCode; 8] = [
        Self::Invalid,
        Self::FullById,
        Self::FullByHash,
        Self::FullByNameVersion,
        Self::ByFilename,
        Self::ByName,
        Self::BySimilarity,
        Self::NoMatch,
    ];

    /// Stable display key used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "0-invalid",
            Self::FullById => "1-full-match-by-id",
            Self::FullByHash => "2-full-match-by-hash",
            Self::FullByNameVersion => "3-full-match-by-name-and-version",
            Self::ByFilename => "4-good-match-by-filename",
            Self::ByName => "5-candidate-match-by-name",
            Self::BySimilarity => "6-candidate-match-similar-component",
            Self::NoMatch => "9-no-match",
        }
    }

    /// Parse a display key back into a code
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == s)
    }

    /// Full matches are trusted without manual review
    #[must_use]
    pub fn is_good_match(self) -> bool {
        matches!(
            self,
            Self::FullById | Self::FullByHash | Self::FullByNameVersion
        )
    }

    /// Whether `self` is strictly stronger evidence than `other`
    #[must_use]
    pub fn is_better_than(self, other: Self) -> bool {
        self < other
    }
}

impl std::fmt::Display for MatchCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

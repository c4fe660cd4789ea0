//! Ordering of free-form version strings.
//!
//! Versions are split into numeric and textual tokens at `.`, `-`, `_` and at
//! every digit/non-digit transition, then compared position by position.
//! A missing position counts as `0` against a number and as the empty string
//! against text, so `2.28 == 2.28.0` but `2.28 < 2.28.rc`. A leading textual
//! token (such as the `v` in `v1.2`) is ignored.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A number was compared against text at the same position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Incompatible versions: cannot compare {left:?} with {right:?}")]
pub struct IncompatibleVersion {
    pub left: String,
    pub right: String,
}

/// One component of a tokenized version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    Numeric(u64),
    Text(String),
}

impl VersionToken {
    fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// The value standing in for a position missing on the other side
    fn padding_for(&self) -> Self {
        match self {
            Self::Numeric(_) => Self::Numeric(0),
            Self::Text(_) => Self::Text(String::new()),
        }
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Split a version string into tokens.
///
/// Separators are consumed. Numbers lose leading zeros (`"01"` becomes `1`);
/// numbers too large for `u64` saturate.
#[must_use]
pub fn tokenize(version: &str) -> Vec<VersionToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_numeric = false;

    for c in version.chars() {
        if matches!(c, '.' | '-' | '_') {
            flush(&mut current, current_numeric, &mut tokens);
            continue;
        }
        let numeric = c.is_ascii_digit();
        if !current.is_empty() && numeric != current_numeric {
            flush(&mut current, current_numeric, &mut tokens);
        }
        current_numeric = numeric;
        current.push(c);
    }
    flush(&mut current, current_numeric, &mut tokens);

    tokens
}

fn flush(current: &mut String, numeric: bool, tokens: &mut Vec<VersionToken>) {
    if current.is_empty() {
        return;
    }
    let token = if numeric {
        VersionToken::Numeric(current.parse().unwrap_or(u64::MAX))
    } else {
        VersionToken::Text(current.to_lowercase())
    };
    tokens.push(token);
    current.clear();
}

/// Comparison key of purely textual versions ("latest", "beta")
static TEXTUAL_KEY: [VersionToken; 3] = [
    VersionToken::Numeric(0),
    VersionToken::Numeric(0),
    VersionToken::Numeric(0),
];

/// A version string with a parsed token sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ComparableVersion {
    raw: String,
    tokens: Vec<VersionToken>,
}

impl ComparableVersion {
    pub fn new(version: impl Into<String>) -> Self {
        let raw = version.into();
        let tokens = tokenize(&raw);
        Self { raw, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[VersionToken] {
        &self.tokens
    }

    /// First token of the version, or the raw string if nothing was tokenized
    #[must_use]
    pub fn major(&self) -> String {
        self.tokens
            .first()
            .map_or_else(|| self.raw.clone(), ToString::to_string)
    }

    /// Compare two versions token by token.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleVersion`] if a numeric token lines up with a
    /// textual one.
    pub fn compare(&self, other: &Self) -> Result<Ordering, IncompatibleVersion> {
        self.walk(other, false).ok_or_else(|| IncompatibleVersion {
            left: self.raw.clone(),
            right: other.raw.clone(),
        })
    }

    /// Total order for sorting: like [`compare`](Self::compare), except that
    /// a number sorts before text at the same position.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.walk(other, true).unwrap_or(Ordering::Equal)
    }

    /// Tokens used for comparison: purely textual versions compare like 0.0.0
    fn key(&self) -> &[VersionToken] {
        if !self.tokens.is_empty() && !self.tokens.iter().any(VersionToken::is_numeric) {
            TEXTUAL_KEY.as_slice()
        } else {
            self.tokens.as_slice()
        }
    }

    /// None on a number/text mismatch unless `numbers_first`
    fn walk(&self, other: &Self, numbers_first: bool) -> Option<Ordering> {
        let left = skip_prefix(self.key());
        let right = skip_prefix(other.key());

        for i in 0..left.len().max(right.len()) {
            let (a, b) = match (left.get(i), right.get(i)) {
                (Some(a), Some(b)) => (a.clone(), b.clone()),
                (Some(a), None) => (a.clone(), a.padding_for()),
                (None, Some(b)) => (b.padding_for(), b.clone()),
                (None, None) => break,
            };

            let ordering = match (&a, &b) {
                (VersionToken::Numeric(x), VersionToken::Numeric(y)) => x.cmp(y),
                (VersionToken::Text(x), VersionToken::Text(y)) => x.cmp(y),
                (VersionToken::Numeric(_), VersionToken::Text(_)) if numbers_first => {
                    Ordering::Less
                }
                (VersionToken::Text(_), VersionToken::Numeric(_)) if numbers_first => {
                    Ordering::Greater
                }
                _ => return None,
            };

            if ordering != Ordering::Equal {
                return Some(ordering);
            }
        }

        Some(Ordering::Equal)
    }
}

/// Sort order for optional version strings: a missing version sorts first.
#[must_use]
pub fn compare_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => ComparableVersion::new(a).sort_cmp(&ComparableVersion::new(b)),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Drop a leading textual token such as `v` in `v1.2.3`
fn skip_prefix(tokens: &[VersionToken]) -> &[VersionToken] {
    match tokens.first() {
        Some(VersionToken::Text(_)) => &tokens[1..],
        _ => tokens,
    }
}

/// Compare two version strings, see [`ComparableVersion::compare`].
///
/// # Errors
///
/// Returns [`IncompatibleVersion`] if the token sequences cannot be aligned.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, IncompatibleVersion> {
    ComparableVersion::new(a).compare(&ComparableVersion::new(b))
}

impl From<String> for ComparableVersion {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ComparableVersion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ComparableVersion> for String {
    fn from(v: ComparableVersion) -> Self {
        v.raw
    }
}

impl std::fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

// Equality and ordering never fail: incompatible versions fall back to
// comparing the raw strings.

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComparableVersion {}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|_| self.raw.cmp(&other.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        compare_versions(a, b).unwrap()
    }

    #[test]
    fn test_tokenize_splits_on_separators_and_transitions() {
        assert_eq!(
            tokenize("1.02-rc3_x"),
            vec![
                VersionToken::Numeric(1),
                VersionToken::Numeric(2),
                VersionToken::Text("rc".to_string()),
                VersionToken::Numeric(3),
                VersionToken::Text("x".to_string()),
            ]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize("..-").is_empty());
    }

    #[test]
    fn test_padding() {
        assert_eq!(cmp("2.28", "2.28.0"), Ordering::Equal);
        assert_eq!(cmp("2.28", "2.28.1"), Ordering::Less);
        assert_eq!(cmp("2.28.1", "2.28"), Ordering::Greater);
        assert_eq!(cmp("2.28", "2.28.rc"), Ordering::Less);
    }

    #[test]
    fn test_prefix_skip() {
        assert_eq!(cmp("v2.13.2.2", "2.13.2.2"), Ordering::Equal);
        assert_eq!(cmp("2.13.2.2", "V2.13.2.2"), Ordering::Equal);
        assert_eq!(cmp("v1.0", "v1.1"), Ordering::Less);
    }

    #[test]
    fn test_numeric_ordering_not_lexical() {
        assert_eq!(cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(cmp("01.2", "1.2"), Ordering::Equal);
    }

    #[test]
    fn test_incompatible_versions() {
        let err = compare_versions("1.0.beta", "1.0.1").unwrap_err();
        assert_eq!(err.left, "1.0.beta");
        assert_eq!(err.right, "1.0.1");
    }

    #[test]
    fn test_operators_fall_back_to_string_comparison() {
        let a = ComparableVersion::new("1.0.beta");
        let b = ComparableVersion::new("1.0.1");
        assert!(a.compare(&b).is_err());
        assert_ne!(a, b);
        assert_eq!(a.cmp(&b), "1.0.beta".cmp("1.0.1"));
        assert_eq!(
            ComparableVersion::new("1.0.beta"),
            ComparableVersion::new("1.0.beta")
        );
    }

    #[test]
    fn test_antisymmetry() {
        let versions = ["1.0", "1.0.0", "v1.2", "2.28.rc", "2.28", "10", "0.9.9", "1.0-1"];
        for a in versions {
            for b in versions {
                let ab = ComparableVersion::new(a).cmp(&ComparableVersion::new(b));
                let ba = ComparableVersion::new(b).cmp(&ComparableVersion::new(a));
                assert_eq!(ab, ba.reverse(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_textual_version_treated_as_zero() {
        let latest = ComparableVersion::new("latest");
        assert_eq!(latest.compare(&ComparableVersion::new("0.0.0")), Ok(Ordering::Equal));
        assert_eq!(latest.compare(&ComparableVersion::new("1.0")), Ok(Ordering::Less));
        assert_eq!(latest.major(), "latest");
        assert_eq!(latest.tokens(), &[VersionToken::Text("latest".to_string())]);
    }

    #[test]
    fn test_sort_cmp_is_total() {
        let beta = ComparableVersion::new("1.0.beta");
        let one = ComparableVersion::new("1.0.1");
        assert_eq!(one.sort_cmp(&beta), Ordering::Less);
        assert_eq!(beta.sort_cmp(&one), Ordering::Greater);
        assert_eq!(
            ComparableVersion::new("1.0").sort_cmp(&ComparableVersion::new("1.0.0")),
            Ordering::Equal
        );

        let mut versions: Vec<ComparableVersion> = ["1.0.beta", "1.0", "1.0.1", "0.9", "1.0.alpha"]
            .into_iter()
            .map(ComparableVersion::from)
            .collect();
        versions.sort_by(ComparableVersion::sort_cmp);
        let sorted: Vec<&str> = versions.iter().map(ComparableVersion::as_str).collect();
        assert_eq!(sorted, vec!["0.9", "1.0", "1.0.1", "1.0.alpha", "1.0.beta"]);
    }

    #[test]
    fn test_major() {
        assert_eq!(ComparableVersion::new("3.4.5").major(), "3");
        assert_eq!(ComparableVersion::new("v3.4").major(), "v");
        assert_eq!(ComparableVersion::new("").major(), "");
        assert_eq!(ComparableVersion::new("...").major(), "...");
    }

    #[test]
    fn test_sorting_descending() {
        let mut versions: Vec<ComparableVersion> = ["1.2", "1.10", "1.9.1", "v2.0"]
            .into_iter()
            .map(ComparableVersion::from)
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        let sorted: Vec<&str> = versions.iter().map(ComparableVersion::as_str).collect();
        assert_eq!(sorted, vec!["v2.0", "1.10", "1.9.1", "1.2"]);
    }
}

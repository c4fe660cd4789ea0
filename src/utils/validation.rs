//! Normalization helpers shared by the matching rules and the BOM loader.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of components accepted in a single BOM
pub const MAX_BOM_COMPONENTS: usize = 100_000;

/// Debian epoch prefix, e.g. the `2:` of `2:5.2.1-1`
static DEBIAN_EPOCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+:").expect("valid epoch regex"));

/// Debian suffix, e.g. the `.debian` of `5.2.1-1.debian`
static DEBIAN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[.~+-]?debian$").expect("valid suffix regex"));

/// Check that a string is a hex digest of any common length.
///
/// # Examples
///
/// ```
/// use bom_mapper::utils::validation::is_valid_hash;
///
/// assert!(is_valid_hash("6aef897c3d6ff0c78aff06ac189178dd"));
/// assert!(is_valid_hash("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709"));
/// assert!(!is_valid_hash("not-a-hash"));
/// assert!(!is_valid_hash(""));
/// ```
#[must_use]
pub fn is_valid_hash(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Trim and lowercase a hash. Returns None if it is not a hex digest.
#[must_use]
pub fn normalize_hash(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if is_valid_hash(trimmed) {
        Some(trimmed.to_lowercase())
    } else {
        None
    }
}

/// Trim and lowercase a component name or version for comparison
#[must_use]
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Last path segment of a file name, lowercased.
///
/// BOMs sometimes carry the path inside an archive or a download URL where
/// the catalog only has the bare file name.
#[must_use]
pub fn normalize_file_name(s: &str) -> String {
    let trimmed = s.trim();
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    base.to_lowercase()
}

/// Lowercase word tokens of a name, split on anything that is not a letter
/// or digit
#[must_use]
pub fn name_words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Strip a Debian epoch and `debian` suffix from a version
#[must_use]
pub fn strip_debian_decorations(version: &str) -> String {
    let without_epoch = DEBIAN_EPOCH.replace(version.trim(), "");
    DEBIAN_SUFFIX.replace(&without_epoch, "").into_owned()
}

/// Check if adding another component would exceed the maximum allowed.
///
/// Returns an error message if the limit is reached, None if safe to add.
#[must_use]
pub fn check_component_limit(count: usize) -> Option<String> {
    if count >= MAX_BOM_COMPONENTS {
        Some(format!(
            "Too many components: BOM exceeds maximum of {MAX_BOM_COMPONENTS}"
        ))
    } else {
        None
    }
}

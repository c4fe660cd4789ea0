//! Package URLs (`pkg:type/namespace/name@version?qualifiers#subpath`).
//!
//! Parsing is delegated to the `packageurl` crate; the parsed parts are kept
//! as owned strings so they can be used as index keys.

use std::collections::BTreeMap;
use std::str::FromStr;

use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Qualifiers that describe where a package came from rather than which
/// package it is. They never discriminate between catalog entries.
pub const INFORMATIONAL_QUALIFIERS: &[&str] = &[
    "repository_url",
    "download_url",
    "vcs_url",
    "checksum",
    "file_name",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid package-url {input:?}: {reason}")]
pub struct PurlError {
    pub input: String,
    pub reason: String,
}

/// A parsed package-url
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Purl {
    raw: String,
    ty: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
    qualifiers: BTreeMap<String, String>,
    subpath: Option<String>,
}

impl Purl {
    /// Parse a package-url string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid package-url.
    pub fn parse(input: &str) -> Result<Self, PurlError> {
        let trimmed = input.trim();
        let parsed = PackageUrl::from_str(trimmed).map_err(|e| PurlError {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        let qualifiers = parsed
            .qualifiers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(Self {
            raw: trimmed.to_string(),
            ty: parsed.ty().to_string(),
            namespace: parsed
                .namespace()
                .filter(|ns| !ns.is_empty())
                .map(str::to_string),
            name: parsed.name().to_string(),
            version: parsed
                .version()
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            qualifiers,
            subpath: parsed.subpath().map(str::to_string),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn qualifiers(&self) -> &BTreeMap<String, String> {
        &self.qualifiers
    }

    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Qualifiers that identify the package variant, without the
    /// informational ones
    pub fn identifying_qualifiers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.qualifiers
            .iter()
            .filter(|(k, _)| !INFORMATIONAL_QUALIFIERS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Same package, same version and same identifying qualifiers
    #[must_use]
    pub fn same_release(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.namespace == other.namespace
            && self.name == other.name
            && self.version == other.version
            && self
                .identifying_qualifiers()
                .eq(other.identifying_qualifiers())
    }
}

impl FromStr for Purl {
    type Err = PurlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Purl {
    type Error = PurlError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Purl> for String {
    fn from(purl: Purl) -> Self {
        purl.raw
    }
}

impl std::fmt::Display for Purl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decode the package-url list stored in a catalog external id.
///
/// Catalogs store several purls either as a JSON array serialized into a
/// string (`["pkg:a/b@1", "pkg:a/b@2"]`) or as a space-separated list.
#[must_use]
pub fn decode_purl_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    trimmed.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_purl() {
        let purl = Purl::parse("pkg:maven/org.apache.commons/commons-lang3@3.12.0?classifier=sources")
            .unwrap();
        assert_eq!(purl.ty(), "maven");
        assert_eq!(purl.namespace(), Some("org.apache.commons"));
        assert_eq!(purl.name(), "commons-lang3");
        assert_eq!(purl.version(), Some("3.12.0"));
        assert_eq!(
            purl.qualifiers().get("classifier").map(String::as_str),
            Some("sources")
        );
    }

    #[test]
    fn test_parse_without_namespace_and_version() {
        let purl = Purl::parse("pkg:npm/lodash").unwrap();
        assert_eq!(purl.namespace(), None);
        assert_eq!(purl.version(), None);
        assert!(purl.qualifiers().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Purl::parse("not a purl").is_err());
        assert!(Purl::parse("").is_err());
    }

    #[test]
    fn test_same_release_ignores_informational_qualifiers() {
        let a = Purl::parse("pkg:deb/debian/sed@1.0~1?type=source").unwrap();
        let b = Purl::parse(
            "pkg:deb/debian/sed@1.0~1?type=source&repository_url=https://deb.debian.org",
        )
        .unwrap();
        let c = Purl::parse("pkg:deb/debian/sed@1.0~1?type=binary").unwrap();
        assert!(a.same_release(&b));
        assert!(!a.same_release(&c));
    }

    #[test]
    fn test_serde_as_string() {
        let purl = Purl::parse("pkg:pypi/requests@2.31.0").unwrap();
        let json = serde_json::to_string(&purl).unwrap();
        assert_eq!(json, "\"pkg:pypi/requests@2.31.0\"");
        let back: Purl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, purl);
        assert!(serde_json::from_str::<Purl>("\"garbage\"").is_err());
    }

    #[test]
    fn test_decode_purl_list() {
        assert_eq!(
            decode_purl_list(r#"["pkg:npm/a@1", "pkg:npm/a@2"]"#),
            vec!["pkg:npm/a@1", "pkg:npm/a@2"]
        );
        assert_eq!(
            decode_purl_list("pkg:npm/a@1 pkg:npm/a@2"),
            vec!["pkg:npm/a@1", "pkg:npm/a@2"]
        );
        assert_eq!(decode_purl_list("pkg:npm/a@1"), vec!["pkg:npm/a@1"]);
        assert!(decode_purl_list("  ").is_empty());
        // Broken JSON falls back to whitespace splitting
        assert_eq!(decode_purl_list("[pkg:npm/a@1"), vec!["[pkg:npm/a@1"]);
    }
}

//! Hierarchical index of catalog package-urls.
//!
//! `PurlIndex` → `TypeNode` → `NamespaceNode` → `NameNode` → version slot
//!
//! Namespace and version keys are optional: a purl without namespace lives
//! under `None`, and a versionless purl (attached to a catalog component
//! rather than a release) lives in the `None` version slot of its name.
//!
//! Slots hold lists. Two different purls that land on the same
//! `(type, namespace, name, version)` key (typically differing only in
//! qualifiers) are both kept; callers tell them apart with
//! [`filter_by_qualifiers`].

use std::collections::{BTreeMap, BTreeSet};

use crate::core::purl::Purl;
use crate::core::types::EntryRef;

/// A purl and the catalog entry carrying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurlEntry {
    pub purl: Purl,
    pub entry: EntryRef,
}

/// All purls sharing a `(type, namespace, name)`, keyed by version
#[derive(Debug, Clone, Default)]
pub struct NameNode {
    versions: BTreeMap<Option<String>, Vec<PurlEntry>>,
}

impl NameNode {
    /// Entries for a specific version (`None` for versionless entries)
    pub fn get(&self, version: Option<&str>) -> Option<&[PurlEntry]> {
        self.versions
            .get(&version.map(str::to_string))
            .map(Vec::as_slice)
    }

    /// Entries carrying a versionless purl (component level)
    pub fn versionless(&self) -> Option<&[PurlEntry]> {
        self.get(None)
    }

    /// Entries carrying a versioned purl (release level)
    pub fn versioned(&self) -> impl Iterator<Item = &PurlEntry> {
        self.versions
            .iter()
            .filter(|(version, _)| version.is_some())
            .flat_map(|(_, entries)| entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceNode {
    names: BTreeMap<String, NameNode>,
}

impl NamespaceNode {
    pub fn get(&self, name: &str) -> Option<&NameNode> {
        self.names.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeNode {
    namespaces: BTreeMap<Option<String>, NamespaceNode>,
}

impl TypeNode {
    pub fn get(&self, namespace: Option<&str>) -> Option<&NamespaceNode> {
        self.namespaces.get(&namespace.map(str::to_string))
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Index: type -> namespace -> name -> version -> entries
#[derive(Debug, Clone, Default)]
pub struct PurlIndex {
    types: BTreeMap<String, TypeNode>,
}

impl PurlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a purl for a catalog entry.
    ///
    /// Returns `(is_new, entry)`: `is_new` is false when the slot already held
    /// this exact purl, in which case `entry` is the ref registered first.
    /// An identical purl with a different ref is still appended so that the
    /// ambiguity stays visible to lookups.
    pub fn insert(&mut self, purl: Purl, entry: EntryRef) -> (bool, EntryRef) {
        let slot = self
            .types
            .entry(purl.ty().to_string())
            .or_default()
            .namespaces
            .entry(purl.namespace().map(str::to_string))
            .or_default()
            .names
            .entry(purl.name().to_string())
            .or_default()
            .versions
            .entry(purl.version().map(str::to_string))
            .or_default();

        let existing = slot
            .iter()
            .find(|e| e.purl.as_str() == purl.as_str())
            .map(|e| e.entry.clone());

        match existing {
            Some(first) => {
                if !slot.iter().any(|e| e.purl.as_str() == purl.as_str() && e.entry == entry) {
                    slot.push(PurlEntry { purl, entry });
                }
                (false, first)
            }
            None => {
                slot.push(PurlEntry {
                    purl,
                    entry: entry.clone(),
                });
                (true, entry)
            }
        }
    }

    pub fn get_by_type(&self, ty: &str) -> Option<&TypeNode> {
        self.types.get(ty)
    }

    pub fn get_by_namespace(&self, ty: &str, namespace: Option<&str>) -> Option<&NamespaceNode> {
        self.get_by_type(ty)?.get(namespace)
    }

    pub fn get_by_name(&self, ty: &str, namespace: Option<&str>, name: &str) -> Option<&NameNode> {
        self.get_by_namespace(ty, namespace)?.get(name)
    }

    pub fn get_by_version(
        &self,
        ty: &str,
        namespace: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Option<&[PurlEntry]> {
        self.get_by_name(ty, namespace, name)?.get(version)
    }

    /// Purl types present in the index
    pub fn types(&self) -> BTreeSet<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Total number of stored entries
    pub fn len(&self) -> usize {
        self.types
            .values()
            .flat_map(|t| t.namespaces.values())
            .flat_map(|ns| ns.names.values())
            .flat_map(|n| n.versions.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Versionless slots claimed by more than one distinct catalog entry.
    ///
    /// Returns one purl per conflicting slot.
    pub fn conflicting_versionless(&self) -> Vec<Purl> {
        let mut conflicts = Vec::new();
        for namespace in self.types.values().flat_map(|t| t.namespaces.values()) {
            for node in namespace.names.values() {
                let Some(entries) = node.versionless() else {
                    continue;
                };
                let distinct: BTreeSet<&EntryRef> = entries.iter().map(|e| &e.entry).collect();
                if distinct.len() > 1 {
                    conflicts.push(entries[0].purl.clone());
                }
            }
        }
        conflicts
    }

    /// Remove the slots addressed by `purls` (their type, namespace, name and
    /// version; qualifiers are ignored), pruning parents left empty.
    ///
    /// Returns the removed entries.
    pub fn remove_duplicates(&mut self, purls: &[Purl]) -> Vec<PurlEntry> {
        let mut removed = Vec::new();
        for purl in purls {
            removed.extend(self.remove_slot(
                purl.ty(),
                purl.namespace(),
                purl.name(),
                purl.version(),
            ));
        }
        removed
    }

    fn remove_slot(
        &mut self,
        ty: &str,
        namespace: Option<&str>,
        name: &str,
        version: Option<&str>,
    ) -> Vec<PurlEntry> {
        let namespace_key = namespace.map(str::to_string);
        let Some(type_node) = self.types.get_mut(ty) else {
            return Vec::new();
        };
        let Some(namespace_node) = type_node.namespaces.get_mut(&namespace_key) else {
            return Vec::new();
        };
        let Some(name_node) = namespace_node.names.get_mut(name) else {
            return Vec::new();
        };

        let removed = name_node
            .versions
            .remove(&version.map(str::to_string))
            .unwrap_or_default();

        if name_node.is_empty() {
            namespace_node.names.remove(name);
        }
        if namespace_node.is_empty() {
            type_node.namespaces.remove(&namespace_key);
        }
        if type_node.is_empty() {
            self.types.remove(ty);
        }

        removed
    }
}

/// How a set of same-version entries relates to a query purl's qualifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierMatch {
    /// Entries carry every qualifier of the query with the same value
    FullMatch,
    /// Entries carry qualifiers that cannot be mapped onto the query
    NoQualifierMapping,
    /// No entry carries an identifying qualifier
    Ignored,
}

/// Narrow entries sharing `(name, version)` down using the query's qualifiers.
///
/// - query qualifiers all present on some entries: `FullMatch` with those
/// - otherwise, some entry has identifying qualifiers: `NoQualifierMapping`
///   with all entries; the caller has to disambiguate
/// - otherwise: `Ignored` with all entries
///
/// Informational qualifiers such as `repository_url` are not considered.
pub fn filter_by_qualifiers<'a>(
    entries: &'a [PurlEntry],
    query: &Purl,
) -> (QualifierMatch, Vec<&'a PurlEntry>) {
    let wanted: Vec<(&str, &str)> = query.identifying_qualifiers().collect();

    if !wanted.is_empty() {
        let full: Vec<&PurlEntry> = entries
            .iter()
            .filter(|e| {
                wanted
                    .iter()
                    .all(|(k, v)| e.purl.qualifiers().get(*k).map(String::as_str) == Some(*v))
            })
            .collect();
        if !full.is_empty() {
            return (QualifierMatch::FullMatch, full);
        }
    }

    let qualified = entries
        .iter()
        .any(|e| e.purl.identifying_qualifiers().next().is_some());
    let status = if qualified {
        QualifierMatch::NoQualifierMapping
    } else {
        QualifierMatch::Ignored
    };
    (status, entries.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purl(s: &str) -> Purl {
        Purl::parse(s).unwrap()
    }

    fn make_test_index() -> PurlIndex {
        let mut index = PurlIndex::new();
        index.insert(
            purl("pkg:maven/org.example/lib@1.0?classifier=sources"),
            EntryRef::new("r-src"),
        );
        index.insert(
            purl("pkg:maven/org.example/lib@1.0?classifier=dist"),
            EntryRef::new("r-dist"),
        );
        index.insert(purl("pkg:maven/org.example/lib"), EntryRef::new("c-lib"));
        index.insert(purl("pkg:npm/left-pad@1.3.0"), EntryRef::new("r-pad"));
        index
    }

    #[test]
    fn test_duplicate_version_insert_keeps_both() {
        let index = make_test_index();
        let slot = index
            .get_by_version("maven", Some("org.example"), "lib", Some("1.0"))
            .unwrap();
        assert_eq!(slot.len(), 2);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_insert_identical_purl() {
        let mut index = PurlIndex::new();
        let (is_new, first) = index.insert(purl("pkg:npm/a@1"), EntryRef::new("r1"));
        assert!(is_new);
        assert_eq!(first, EntryRef::new("r1"));

        // Same purl, same ref: no-op
        let (is_new, existing) = index.insert(purl("pkg:npm/a@1"), EntryRef::new("r1"));
        assert!(!is_new);
        assert_eq!(existing, EntryRef::new("r1"));
        assert_eq!(index.len(), 1);

        // Same purl, other ref: kept so the conflict stays visible
        let (is_new, existing) = index.insert(purl("pkg:npm/a@1"), EntryRef::new("r2"));
        assert!(!is_new);
        assert_eq!(existing, EntryRef::new("r1"));
        assert_eq!(index.get_by_version("npm", None, "a", Some("1")).unwrap().len(), 2);
    }

    #[test]
    fn test_lookup_missing_segments() {
        let index = make_test_index();
        assert!(index.get_by_namespace("pypi", None).is_none());
        assert!(index.get_by_namespace("maven", Some("org.other")).is_none());
        assert!(index.get_by_name("maven", Some("org.example"), "other").is_none());
        assert!(index
            .get_by_version("maven", Some("org.example"), "lib", Some("2.0"))
            .is_none());
        assert!(index.get_by_name("npm", None, "left-pad").is_some());
    }

    #[test]
    fn test_versionless_and_versioned() {
        let index = make_test_index();
        let node = index.get_by_name("maven", Some("org.example"), "lib").unwrap();
        assert_eq!(node.versionless().unwrap()[0].entry, EntryRef::new("c-lib"));
        assert_eq!(node.versioned().count(), 2);
    }

    #[test]
    fn test_filter_by_qualifiers_full_match() {
        let index = make_test_index();
        let slot = index
            .get_by_version("maven", Some("org.example"), "lib", Some("1.0"))
            .unwrap();

        let (status, hits) =
            filter_by_qualifiers(slot, &purl("pkg:maven/org.example/lib@1.0?classifier=dist"));
        assert_eq!(status, QualifierMatch::FullMatch);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry, EntryRef::new("r-dist"));
    }

    #[test]
    fn test_filter_by_qualifiers_without_query_qualifiers() {
        let index = make_test_index();
        let slot = index
            .get_by_version("maven", Some("org.example"), "lib", Some("1.0"))
            .unwrap();

        let (status, hits) = filter_by_qualifiers(slot, &purl("pkg:maven/org.example/lib@1.0"));
        assert_eq!(status, QualifierMatch::NoQualifierMapping);
        assert_eq!(hits.len(), 2);

        let (status, hits) =
            filter_by_qualifiers(slot, &purl("pkg:maven/org.example/lib@1.0?classifier=javadoc"));
        assert_eq!(status, QualifierMatch::NoQualifierMapping);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_filter_by_qualifiers_ignored() {
        let mut index = PurlIndex::new();
        index.insert(
            purl("pkg:npm/a@1?repository_url=https://registry.example"),
            EntryRef::new("r1"),
        );
        let slot = index.get_by_version("npm", None, "a", Some("1")).unwrap();

        let (status, hits) = filter_by_qualifiers(slot, &purl("pkg:npm/a@1?arch=x86"));
        assert_eq!(status, QualifierMatch::Ignored);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_conflicting_versionless() {
        let mut index = make_test_index();
        assert!(index.conflicting_versionless().is_empty());

        index.insert(purl("pkg:maven/org.example/lib"), EntryRef::new("c-lib-fork"));
        let conflicts = index.conflicting_versionless();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name(), "lib");
    }

    #[test]
    fn test_remove_duplicates_prunes_empty_parents() {
        let mut index = make_test_index();

        let removed = index.remove_duplicates(&[purl("pkg:npm/left-pad@1.3.0")]);
        assert_eq!(removed.len(), 1);
        assert!(index.get_by_type("npm").is_none());
        assert!(!index.types().contains("npm"));

        // Removing the component slot leaves the release slots alone
        let removed = index.remove_duplicates(&[purl("pkg:maven/org.example/lib")]);
        assert_eq!(removed.len(), 1);
        let node = index.get_by_name("maven", Some("org.example"), "lib").unwrap();
        assert!(node.versionless().is_none());
        assert_eq!(node.versioned().count(), 2);

        let removed = index.remove_duplicates(&[purl("pkg:maven/org.example/lib@1.0")]);
        assert_eq!(removed.len(), 2);
        assert!(index.is_empty());

        assert!(index.remove_duplicates(&[purl("pkg:maven/org.example/lib@1.0")]).is_empty());
    }
}

//! Package-url lookups against the catalog.
//!
//! The [`PurlIndex`] is filled lazily from two bulk external-id queries (one
//! for components, one for releases) and then answers purl lookups without
//! further catalog traffic, except when a component has to be resolved
//! through one of its releases.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::catalog::client::{fetch_entry, Catalog, CatalogError, Scope};
use crate::catalog::purl_index::{filter_by_qualifiers, PurlIndex, QualifierMatch};
use crate::core::entry::PURL_EXTERNAL_ID;
use crate::core::purl::{decode_purl_list, Purl};
use crate::core::types::EntryRef;

/// Catalog refs found for a purl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurlMatches {
    /// Distinct refs, in index order
    pub refs: Vec<EntryRef>,
    /// Qualifier classification, for release lookups
    pub qualifier_match: Option<QualifierMatch>,
}

impl PurlMatches {
    fn from_refs<'a>(refs: impl IntoIterator<Item = &'a EntryRef>) -> Self {
        let mut distinct: Vec<EntryRef> = Vec::new();
        for entry in refs {
            if !distinct.contains(entry) {
                distinct.push(entry.clone());
            }
        }
        Self {
            refs: distinct,
            qualifier_match: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The single ref, if the purl resolved unambiguously
    pub fn unique(&self) -> Option<&EntryRef> {
        match self.refs.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    /// More than one distinct ref: the caller has to report a conflict
    pub fn is_ambiguous(&self) -> bool {
        self.refs.len() > 1
    }
}

/// Builds and queries the purl index of a catalog
#[derive(Debug, Default)]
pub struct CatalogQueryService {
    index: PurlIndex,
    /// Purl types already loaded from the catalog
    loaded_types: BTreeSet<String>,
    /// Every type has been loaded
    complete: bool,
}

impl CatalogQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &PurlIndex {
        &self.index
    }

    /// Whether lookups for `purl_type` can be answered without rebuilding
    pub fn has_type(&self, purl_type: &str) -> bool {
        self.complete || self.loaded_types.contains(purl_type)
    }

    /// Fill the purl index from the catalog.
    ///
    /// With `purl_types`, only those types are loaded, and nothing happens if
    /// all of them were loaded before. Without, every type is loaded once.
    /// Unparseable purls are skipped; `quiet` lowers their warnings to debug.
    ///
    /// # Errors
    ///
    /// Returns any error of the bulk catalog queries.
    pub fn build_purl_cache(
        &mut self,
        catalog: &dyn Catalog,
        purl_types: Option<&BTreeSet<String>>,
        quiet: bool,
    ) -> Result<(), CatalogError> {
        if self.complete {
            return Ok(());
        }

        let missing: Option<BTreeSet<String>> = purl_types.map(|types| {
            types
                .iter()
                .filter(|t| !self.loaded_types.contains(*t))
                .cloned()
                .collect()
        });
        if missing.as_ref().is_some_and(BTreeSet::is_empty) {
            return Ok(());
        }

        let mut inserted = 0;
        let mut skipped = 0;
        for scope in [Scope::Component, Scope::Release] {
            let records = catalog.bulk_search_by_external_id(PURL_EXTERNAL_ID, scope)?;
            for record in records {
                let Some(value) = record.external_ids.get(PURL_EXTERNAL_ID) else {
                    continue;
                };
                for raw in decode_purl_list(value) {
                    let purl = match Purl::parse(&raw) {
                        Ok(purl) => purl,
                        Err(e) => {
                            skipped += 1;
                            if quiet {
                                debug!("Skipping purl of {}: {}", record.self_ref, e);
                            } else {
                                warn!("Skipping purl of {}: {}", record.self_ref, e);
                            }
                            continue;
                        }
                    };

                    if missing.as_ref().is_some_and(|m| !m.contains(purl.ty())) {
                        continue;
                    }

                    // Components carry versionless purls, releases versioned ones
                    let versioned = purl.version().is_some();
                    if versioned != (scope == Scope::Release) {
                        debug!(
                            "Ignoring {} purl {} of {}",
                            scope, purl, record.self_ref
                        );
                        continue;
                    }

                    if self.index.insert(purl, record.self_ref.clone()).0 {
                        inserted += 1;
                    }
                }
            }
        }

        let conflicts = self.index.conflicting_versionless();
        for purl in &conflicts {
            warn!(
                "Package-url {} is used by several components, resolving it through releases",
                purl
            );
        }
        self.index.remove_duplicates(&conflicts);

        match missing {
            Some(types) => self.loaded_types.extend(types),
            None => self.complete = true,
        }

        info!(
            "Indexed {} package-urls ({} skipped, {} total)",
            inserted,
            skipped,
            self.index.len()
        );
        Ok(())
    }

    /// Releases carrying `purl`.
    ///
    /// Entries of the purl's version are narrowed down by qualifiers. Several
    /// distinct refs in the result mean the purl is ambiguous.
    pub fn search_releases_by_purl(&self, purl: &Purl) -> PurlMatches {
        let Some(version) = purl.version() else {
            return PurlMatches::default();
        };
        let Some(slot) =
            self.index
                .get_by_version(purl.ty(), purl.namespace(), purl.name(), Some(version))
        else {
            return PurlMatches::default();
        };

        let (status, hits) = filter_by_qualifiers(slot, purl);
        let mut matches = PurlMatches::from_refs(hits.into_iter().map(|e| &e.entry));
        matches.qualifier_match = Some(status);
        matches
    }

    /// Components carrying `purl` (its version is ignored).
    ///
    /// Uses the component-level purls if there are any; otherwise resolves
    /// the owning component of every release with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if a release cannot be fetched or has no owning
    /// component.
    pub fn search_components_by_purl(
        &self,
        catalog: &dyn Catalog,
        purl: &Purl,
    ) -> Result<PurlMatches, CatalogError> {
        let Some(node) = self
            .index
            .get_by_name(purl.ty(), purl.namespace(), purl.name())
        else {
            return Ok(PurlMatches::default());
        };

        if let Some(entries) = node.versionless() {
            return Ok(PurlMatches::from_refs(entries.iter().map(|e| &e.entry)));
        }

        let mut components: Vec<EntryRef> = Vec::new();
        let mut seen_releases: BTreeSet<&EntryRef> = BTreeSet::new();
        for entry in node.versioned() {
            if !seen_releases.insert(&entry.entry) {
                continue;
            }
            let release = fetch_entry(catalog, &entry.entry)?;
            let component = release.component_id.ok_or_else(|| {
                CatalogError::Malformed(format!("release {} has no component", entry.entry))
            })?;
            if !components.contains(&component) {
                components.push(component);
            }
        }

        Ok(PurlMatches::from_refs(components.iter()))
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::cache::{CacheError, ComponentCache};
use crate::catalog::client::{fetch_entry, Catalog, CatalogError};
use crate::catalog::query::{CatalogQueryService, PurlMatches};
use crate::core::descriptor::ComponentDescriptor;
use crate::core::entry::CatalogEntry;
use crate::core::purl::Purl;
use crate::core::types::{EntryRef, MatchCode};
use crate::core::version::compare_optional;
use crate::matching::result::MatchResult;
use crate::matching::rules;

/// Words ignored by the similarity rule unless configured otherwise
pub const DEFAULT_NOISE_WORDS: &[&str] = &["cordova", "plugin"];

/// Default number of words two names must share to be similar
pub const DEFAULT_MIN_SHARED_WORDS: usize = 2;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error(
        "No data source: offline mapping needs a non-empty component cache, \
         online mapping needs a catalog"
    )]
    NoDataSource,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Configuration for the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Look releases up in the live catalog instead of the component cache
    pub online: bool,
    /// Keep name-only candidates
    pub allow_name_only: bool,
    /// Try the similar-name rule
    pub similarity: bool,
    /// Ignore Debian epochs and `debian` suffixes when comparing versions
    pub relaxed_debian: bool,
    /// Drop candidates without a clearing report or license info
    pub require_clearing_result: bool,
    /// Words the similarity rule does not count
    pub similarity_noise_words: Vec<String>,
    /// Words two names must share to be similar
    pub min_shared_words: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            online: false,
            allow_name_only: false,
            similarity: false,
            relaxed_debian: false,
            require_clearing_result: false,
            similarity_noise_words: DEFAULT_NOISE_WORDS.iter().map(|w| (*w).to_string()).collect(),
            min_shared_words: DEFAULT_MIN_SHARED_WORDS,
        }
    }
}

/// State shared by every descriptor of a run: the catalog handle, the
/// package-url index and the component cache.
pub struct MatchingContext<'a> {
    catalog: Option<&'a dyn Catalog>,
    cache: Option<ComponentCache>,
    query: CatalogQueryService,
}

impl<'a> MatchingContext<'a> {
    pub fn new(catalog: Option<&'a dyn Catalog>, cache: Option<ComponentCache>) -> Self {
        Self {
            catalog,
            cache,
            query: CatalogQueryService::new(),
        }
    }

    pub fn catalog(&self) -> Option<&'a dyn Catalog> {
        self.catalog
    }

    pub fn cache(&self) -> Option<&ComponentCache> {
        self.cache.as_ref()
    }

    pub fn query(&self) -> &CatalogQueryService {
        &self.query
    }

    /// Where entries are fetched from: the live catalog, else the cache
    fn source(&self) -> Option<&dyn Catalog> {
        match (self.catalog, &self.cache) {
            (Some(catalog), _) => Some(catalog),
            (None, Some(cache)) => Some(cache as &dyn Catalog),
            (None, None) => None,
        }
    }

    fn check_data_source(&self, online: bool) -> Result<(), MappingError> {
        let usable = if online {
            self.catalog.is_some()
        } else {
            self.cache.as_ref().is_some_and(|c| !c.is_empty())
        };
        if usable {
            Ok(())
        } else {
            Err(MappingError::NoDataSource)
        }
    }

    /// Load the purl index for the given types from the current source
    fn index_purl_types(&mut self, types: &BTreeSet<String>, quiet: bool) -> Result<(), CatalogError> {
        let source: &dyn Catalog = match (self.catalog, &self.cache) {
            (Some(catalog), _) => catalog,
            (None, Some(cache)) => cache,
            (None, None) => return Ok(()),
        };
        self.query.build_purl_cache(source, Some(types), quiet)
    }

    fn search_components_by_purl(&self, purl: &Purl) -> Result<PurlMatches, CatalogError> {
        match self.source() {
            Some(source) => self.query.search_components_by_purl(source, purl),
            None => Ok(PurlMatches::default()),
        }
    }
}

/// The main matching engine
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    /// Create a new matching engine with custom configuration
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Map every descriptor of a BOM, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NoDataSource`] if neither the catalog nor a
    /// usable cache is available, or the first catalog error. A failure
    /// aborts the whole batch.
    pub fn map_bom(
        &self,
        context: &mut MatchingContext<'_>,
        descriptors: &[ComponentDescriptor],
    ) -> Result<Vec<MatchResult>, MappingError> {
        context.check_data_source(self.config.online)?;

        let purl_types: BTreeSet<String> = descriptors
            .iter()
            .filter_map(|d| d.purl.as_ref())
            .map(|p| p.ty().to_string())
            .collect();
        if !purl_types.is_empty() {
            context.index_purl_types(&purl_types, false)?;
        }

        let mut results = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            results.push(self.map_descriptor(context, descriptor)?);
        }

        let good = results.iter().filter(|r| r.is_good_match()).count();
        info!("Mapped {} components, {} with a full match", results.len(), good);
        Ok(results)
    }

    /// Map a single descriptor.
    ///
    /// Package-url lookups come first: a unique release hit is final, a
    /// unique component hit narrows the scan to that component. The scan
    /// then classifies every candidate release and keeps the strongest.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NoDataSource`] without a usable source, or any
    /// catalog access error.
    pub fn map_descriptor(
        &self,
        context: &mut MatchingContext<'_>,
        descriptor: &ComponentDescriptor,
    ) -> Result<MatchResult, MappingError> {
        context.check_data_source(self.config.online)?;

        let mut result = MatchResult::new(descriptor.clone());

        if self.match_catalog_id(context, &mut result)? {
            self.apply_clearing_filter(context, &mut result)?;
            return Ok(result);
        }

        let mut component_hint = None;
        if let Some(purl) = &descriptor.purl {
            let types = BTreeSet::from([purl.ty().to_string()]);
            context.index_purl_types(&types, false)?;

            if self.match_release_purl(context, purl, &mut result)? {
                self.apply_clearing_filter(context, &mut result)?;
                return Ok(result);
            }
            component_hint = self.find_component_by_purl(context, purl, &mut result)?;
        }

        let candidates = self.candidate_releases(context, descriptor, component_hint.as_ref())?;
        debug!(
            "Scanning {} releases for {}",
            candidates.len(),
            descriptor.label()
        );

        // an ambiguous package-url is no identifier
        let purl_is_id = result.purl_conflicts.is_empty();
        for entry in candidates {
            let code = rules::classify(descriptor, &entry, &self.config, purl_is_id);
            if code == MatchCode::ByName && !self.config.allow_name_only {
                debug!(
                    "Skipping name-only match {} for {}",
                    entry.label(),
                    descriptor.label()
                );
                continue;
            }
            result.add_match_if_better(entry, code);
            if result.result == MatchCode::FullById {
                break;
            }
        }

        self.apply_clearing_filter(context, &mut result)?;
        Ok(result)
    }

    /// A catalog id carried by the descriptor, if it still names a release
    fn match_catalog_id(
        &self,
        context: &MatchingContext<'_>,
        result: &mut MatchResult,
    ) -> Result<bool, MappingError> {
        let (Some(id), Some(source)) = (result.descriptor.catalog_id.clone(), context.source())
        else {
            return Ok(false);
        };

        match fetch_entry(source, &id) {
            Ok(entry) if entry.is_release() => Ok(result.add_match_if_better(entry, MatchCode::FullById)),
            Ok(_) => {
                debug!("Catalog id {} of {} is not a release", id, result.descriptor.label());
                Ok(false)
            }
            Err(CatalogError::NotFound(_)) => {
                debug!("Catalog id {} of {} is unknown", id, result.descriptor.label());
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Purl phase, release level. Returns whether a unique release was found.
    fn match_release_purl(
        &self,
        context: &MatchingContext<'_>,
        purl: &Purl,
        result: &mut MatchResult,
    ) -> Result<bool, MappingError> {
        let matches = context.query().search_releases_by_purl(purl);
        if matches.is_ambiguous() {
            warn!(
                "Package-url {} matches {} releases: {}",
                purl,
                matches.refs.len(),
                join_refs(&matches.refs)
            );
            record_conflicts(result, &matches.refs);
            return Ok(false);
        }

        let (Some(id), Some(source)) = (matches.unique(), context.source()) else {
            return Ok(false);
        };
        let entry = fetch_entry(source, id)?;
        Ok(result.add_match_if_better(entry, MatchCode::FullById))
    }

    /// Purl phase, component level. An ambiguous hit is recorded and not
    /// used as a hint.
    fn find_component_by_purl(
        &self,
        context: &MatchingContext<'_>,
        purl: &Purl,
        result: &mut MatchResult,
    ) -> Result<Option<EntryRef>, MappingError> {
        let matches = context.search_components_by_purl(purl)?;
        if matches.is_ambiguous() {
            warn!(
                "Package-url {} matches {} components: {}",
                purl,
                matches.refs.len(),
                join_refs(&matches.refs)
            );
            record_conflicts(result, &matches.refs);
            return Ok(None);
        }
        Ok(matches.unique().cloned())
    }

    /// Releases to scan, in scan order.
    ///
    /// Online: the releases of the hinted component, or of every component
    /// found by name, newest first per component. Offline: the cached
    /// releases of the hinted component, or the whole cache.
    fn candidate_releases(
        &self,
        context: &MatchingContext<'_>,
        descriptor: &ComponentDescriptor,
        component_hint: Option<&EntryRef>,
    ) -> Result<Vec<CatalogEntry>, MappingError> {
        if self.config.online {
            let Some(catalog) = context.catalog() else {
                return Err(MappingError::NoDataSource);
            };
            let components = match component_hint {
                Some(component) => vec![component.clone()],
                None => catalog.search_by_name(&descriptor.name)?,
            };

            let mut releases = Vec::new();
            for component_id in &components {
                let component = fetch_entry(catalog, component_id)?;
                let mut component_releases = Vec::with_capacity(component.releases.len());
                for release_id in &component.releases {
                    component_releases.push(fetch_entry(catalog, release_id)?);
                }
                component_releases.sort_by(|a, b| {
                    compare_optional(b.version.as_deref(), a.version.as_deref())
                });
                releases.extend(component_releases);
            }
            return Ok(releases);
        }

        let Some(cache) = context.cache() else {
            return Err(MappingError::NoDataSource);
        };
        Ok(match component_hint {
            Some(component) => cache.releases_of(component).cloned().collect(),
            None => cache.releases().to_vec(),
        })
    }

    /// Drop candidates without a clearing artifact when configured to
    fn apply_clearing_filter(
        &self,
        context: &MatchingContext<'_>,
        result: &mut MatchResult,
    ) -> Result<(), MappingError> {
        if !self.config.require_clearing_result || result.releases.is_empty() {
            return Ok(());
        }
        let Some(source) = context.source() else {
            return Ok(());
        };

        let mut cleared = BTreeSet::new();
        for candidate in &result.releases {
            if source.entry_has_clearing_artifact(&candidate.entry.id)? {
                cleared.insert(candidate.entry.id.clone());
            }
        }

        let before = result.releases.len();
        result.retain_candidates(|c| cleared.contains(&c.entry.id));
        if result.releases.len() < before {
            debug!(
                "Dropped {} candidates without clearing result for {}",
                before - result.releases.len(),
                result.descriptor.label()
            );
        }
        Ok(())
    }
}

fn record_conflicts(result: &mut MatchResult, refs: &[EntryRef]) {
    for entry in refs {
        if !result.purl_conflicts.contains(entry) {
            result.purl_conflicts.push(entry.clone());
        }
    }
}

fn join_refs(refs: &[EntryRef]) -> String {
    refs.iter()
        .map(EntryRef::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::client::{ExternalIdRecord, Scope};
    use crate::catalog::store::JsonCatalog;
    use chrono::Utc;

    fn purl(s: &str) -> Purl {
        Purl::parse(s).unwrap()
    }

    fn make_test_catalog() -> JsonCatalog {
        JsonCatalog::from_entries(
            vec![
                CatalogEntry::component("c-sed", "sed"),
                CatalogEntry::component("c-mail", "mail"),
                CatalogEntry::component("c-mail-fork", "mail"),
                CatalogEntry::component("c-libfoo", "libfoo"),
                CatalogEntry::component("c-zlib", "zlib").with_purl("pkg:generic/zlib"),
                CatalogEntry::component("c-camera", "camera-preview"),
            ],
            vec![
                CatalogEntry::release("r-sed", "c-sed", "sed", "1.0~1")
                    .with_purl("pkg:deb/debian/sed@1.0~1?type=source")
                    .with_clearing_result(true),
                CatalogEntry::release("r-mail-14", "c-mail", "mail", "1.4")
                    .with_clearing_result(true),
                CatalogEntry::release("r-mail-15", "c-mail", "mail", "1.5"),
                CatalogEntry::release("r-mail-fork-14", "c-mail-fork", "mail", "1.4"),
                CatalogEntry::release("r-libfoo", "c-libfoo", "libfoo", "2:5.2.1-1"),
                CatalogEntry::release("r-zlib-12", "c-zlib", "zlib", "1.2")
                    .with_source_file(Some("zlib-1.2.tar.gz"), Some("aaaa")),
                CatalogEntry::release("r-zlib-13", "c-zlib", "zlib", "1.3")
                    .with_source_file(Some("zlib-1.3.tar.gz"), Some("bbbb")),
                CatalogEntry::release("r-camera", "c-camera", "camera-preview", "2.0"),
            ],
        )
    }

    fn offline_context(catalog: &JsonCatalog) -> MatchingContext<'static> {
        let cache = ComponentCache::from_releases(catalog.all_releases().unwrap(), Utc::now());
        MatchingContext::new(None, Some(cache))
    }

    fn online_config() -> MatchingConfig {
        MatchingConfig {
            online: true,
            ..MatchingConfig::default()
        }
    }

    fn candidate_ids(result: &MatchResult) -> Vec<&str> {
        result.releases.iter().map(|c| c.entry.id.as_str()).collect()
    }

    #[test]
    fn test_sed_end_to_end() {
        let catalog = make_test_catalog();
        let mut context = MatchingContext::new(Some(&catalog), None);
        let engine = MatchingEngine::new(online_config());

        let descriptor = ComponentDescriptor::new("sed", Some("1.0~1"))
            .with_purl(purl("pkg:deb/debian/sed@1.0~1?type=source"));
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();

        assert_eq!(result.result, MatchCode::FullById);
        assert_eq!(candidate_ids(&result), vec!["r-sed"]);
        assert!(result.purl_conflicts.is_empty());
    }

    #[test]
    fn test_purl_match_beats_name_version() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());
        let mut context = offline_context(&catalog);

        // Name and version point at r-mail-14, the purl at r-sed
        let descriptor = ComponentDescriptor::new("mail", Some("1.4"))
            .with_purl(purl("pkg:deb/debian/sed@1.0~1?type=source"));
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();

        assert_eq!(result.result, MatchCode::FullById);
        assert_eq!(candidate_ids(&result), vec!["r-sed"]);
    }

    #[test]
    fn test_ties_accumulate() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(online_config());
        let mut context = MatchingContext::new(Some(&catalog), None);

        let descriptor = ComponentDescriptor::new("mail", Some("1.4"));
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();

        assert_eq!(result.result, MatchCode::FullByNameVersion);
        assert_eq!(candidate_ids(&result), vec!["r-mail-14", "r-mail-fork-14"]);
    }

    #[test]
    fn test_relaxed_debian_versions() {
        let catalog = make_test_catalog();
        let descriptor = ComponentDescriptor::new("libfoo", Some("5.2.1-1.debian"));

        let engine = MatchingEngine::new(MatchingConfig::default());
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::NoMatch);

        let engine = MatchingEngine::new(MatchingConfig {
            relaxed_debian: true,
            ..MatchingConfig::default()
        });
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::FullByNameVersion);
        assert_eq!(candidate_ids(&result), vec!["r-libfoo"]);
    }

    #[test]
    fn test_name_only_requires_opt_in() {
        let catalog = make_test_catalog();
        let descriptor = ComponentDescriptor::new("mail", Some("9.9"));

        let engine = MatchingEngine::new(MatchingConfig::default());
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::NoMatch);
        assert!(result.releases.is_empty());

        let engine = MatchingEngine::new(MatchingConfig {
            allow_name_only: true,
            ..MatchingConfig::default()
        });
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::ByName);
        assert_eq!(result.releases.len(), 3);
    }

    #[test]
    fn test_component_purl_narrows_scan() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());
        let mut context = offline_context(&catalog);

        // Offline the cache has no component purls and the whole cache is
        // scanned; online the component purl limits the scan to c-zlib.
        let descriptor = ComponentDescriptor::new("libz", Some("1.3"))
            .with_purl(purl("pkg:generic/zlib@1.3"))
            .with_source_file(Some("zlib-1.3.tar.gz"), None);
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();
        assert_eq!(result.result, MatchCode::ByFilename);
        assert_eq!(candidate_ids(&result), vec!["r-zlib-13"]);

        let engine = MatchingEngine::new(online_config());
        let mut context = MatchingContext::new(Some(&catalog), None);
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();
        assert_eq!(result.result, MatchCode::ByFilename);
        assert_eq!(candidate_ids(&result), vec!["r-zlib-13"]);
    }

    #[test]
    fn test_hash_match_stronger_than_file_name() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());

        let descriptor = ComponentDescriptor::new("zlib-sources", None)
            .with_source_file(Some("zlib-1.3.tar.gz"), Some("AAAA"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::FullByHash);
        assert_eq!(candidate_ids(&result), vec!["r-zlib-12"]);
    }

    #[test]
    fn test_catalog_id_from_previous_run() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());

        let descriptor = ComponentDescriptor::new("whatever", None)
            .with_catalog_id(EntryRef::new("r-mail-15"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::FullById);
        assert_eq!(candidate_ids(&result), vec!["r-mail-15"]);

        let stale = ComponentDescriptor::new("whatever", None)
            .with_catalog_id(EntryRef::new("r-gone"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &stale)
            .unwrap();
        assert_eq!(result.result, MatchCode::NoMatch);
    }

    #[test]
    fn test_similarity() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig {
            similarity: true,
            ..MatchingConfig::default()
        });

        let descriptor = ComponentDescriptor::new("cordova-plugin-camera-preview", Some("2.0"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::BySimilarity);
        assert_eq!(candidate_ids(&result), vec!["r-camera"]);
    }

    #[test]
    fn test_require_clearing_result() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig {
            require_clearing_result: true,
            ..MatchingConfig::default()
        });

        let descriptor = ComponentDescriptor::new("mail", Some("1.4"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(candidate_ids(&result), vec!["r-mail-14"]);

        let descriptor = ComponentDescriptor::new("mail", Some("1.5"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();
        assert_eq!(result.result, MatchCode::NoMatch);
        assert!(result.releases.is_empty());
    }

    #[test]
    fn test_ambiguous_release_purl_is_reported() {
        let catalog = JsonCatalog::from_entries(
            vec![
                CatalogEntry::component("c-a", "left-pad"),
                CatalogEntry::component("c-b", "left-pad-fork"),
            ],
            vec![
                CatalogEntry::release("r-a", "c-a", "left-pad", "1.3.0")
                    .with_purl("pkg:npm/left-pad@1.3.0"),
                CatalogEntry::release("r-b", "c-b", "left-pad-fork", "1.3.0")
                    .with_purl("pkg:npm/left-pad@1.3.0"),
            ],
        );
        let engine = MatchingEngine::new(MatchingConfig::default());
        let mut context = offline_context(&catalog);

        let descriptor = ComponentDescriptor::new("left-pad", Some("1.3.0"))
            .with_purl(purl("pkg:npm/left-pad@1.3.0"));
        let result = engine.map_descriptor(&mut context, &descriptor).unwrap();

        // Both the releases and their components are ambiguous
        assert_eq!(
            result.purl_conflicts,
            vec![
                EntryRef::new("r-a"),
                EntryRef::new("r-b"),
                EntryRef::new("c-a"),
                EntryRef::new("c-b"),
            ]
        );
        // Falls back to name and version
        assert_eq!(result.result, MatchCode::FullByNameVersion);
        assert_eq!(candidate_ids(&result), vec!["r-a"]);
    }

    #[test]
    fn test_hash_outranks_name_version_on_same_release() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());

        let descriptor =
            ComponentDescriptor::new("zlib", Some("1.3")).with_source_file(None, Some("BBBB"));
        let result = engine
            .map_descriptor(&mut offline_context(&catalog), &descriptor)
            .unwrap();

        assert_eq!(result.result, MatchCode::FullByHash);
        assert_eq!(candidate_ids(&result), vec!["r-zlib-13"]);
    }

    /// Answers searches but refuses every entry fetch
    struct LockedCatalog;

    impl Catalog for LockedCatalog {
        fn bulk_search_by_external_id(
            &self,
            _id_name: &str,
            _scope: Scope,
        ) -> Result<Vec<ExternalIdRecord>, CatalogError> {
            Ok(Vec::new())
        }

        fn get_entry_by_ref(&self, _entry: &EntryRef) -> Result<CatalogEntry, CatalogError> {
            Err(CatalogError::Unauthorized("401".to_string()))
        }

        fn search_by_name(&self, name: &str) -> Result<Vec<EntryRef>, CatalogError> {
            Ok(vec![EntryRef::new(format!("c-{name}"))])
        }

        fn entry_has_clearing_artifact(&self, _entry: &EntryRef) -> Result<bool, CatalogError> {
            Ok(false)
        }

        fn all_releases(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_auth_failure_aborts_batch() {
        let catalog = LockedCatalog;
        let mut context = MatchingContext::new(Some(&catalog), None);
        let engine = MatchingEngine::new(online_config());

        let err = engine
            .map_bom(
                &mut context,
                &[
                    ComponentDescriptor::new("sed", Some("1.0~1")),
                    ComponentDescriptor::new("mail", Some("1.4")),
                ],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            MappingError::Catalog(CatalogError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_release_without_component_is_malformed() {
        let orphan = CatalogEntry {
            component_id: None,
            ..CatalogEntry::release("r-orphan", "unused", "orphan", "1.0")
                .with_purl("pkg:npm/orphan@1.0")
        };
        let catalog = JsonCatalog::from_entries(Vec::new(), vec![orphan]);
        let mut context = MatchingContext::new(Some(&catalog), None);
        let engine = MatchingEngine::new(online_config());

        // No release carries 2.0, so the owning component is looked up
        let descriptor =
            ComponentDescriptor::new("orphan", Some("2.0")).with_purl(purl("pkg:npm/orphan@2.0"));
        let err = engine.map_bom(&mut context, &[descriptor]).unwrap_err();
        assert!(matches!(
            err,
            MappingError::Catalog(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn test_offline_without_cache_is_fatal() {
        let engine = MatchingEngine::new(MatchingConfig::default());
        let mut context = MatchingContext::new(None, None);
        let err = engine
            .map_bom(&mut context, &[ComponentDescriptor::new("sed", None)])
            .unwrap_err();
        assert!(matches!(err, MappingError::NoDataSource));

        let mut context =
            MatchingContext::new(None, Some(ComponentCache::from_releases(Vec::new(), Utc::now())));
        assert!(matches!(
            engine.map_descriptor(&mut context, &ComponentDescriptor::new("sed", None)),
            Err(MappingError::NoDataSource)
        ));
    }

    #[test]
    fn test_map_bom_keeps_order() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(MatchingConfig::default());
        let mut context = offline_context(&catalog);

        let results = engine
            .map_bom(
                &mut context,
                &[
                    ComponentDescriptor::new("zlib", Some("1.2")),
                    ComponentDescriptor::new("unknown", Some("1.0")),
                    ComponentDescriptor::new("sed", Some("1.0~1"))
                        .with_purl(purl("pkg:deb/debian/sed@1.0~1?type=source")),
                ],
            )
            .unwrap();

        let codes: Vec<MatchCode> = results.iter().map(|r| r.result).collect();
        assert_eq!(
            codes,
            vec![
                MatchCode::FullByNameVersion,
                MatchCode::NoMatch,
                MatchCode::FullById
            ]
        );
        assert!(context.query().has_type("deb"));
    }
}

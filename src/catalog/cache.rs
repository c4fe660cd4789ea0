//! Flat snapshot of every catalog release, stored as a JSON file.
//!
//! The cache lets mapping run without per-release catalog traffic. It is
//! refreshed from a [`Catalog`] when missing, older than the configured age,
//! or when a refresh is forced.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::client::{Catalog, CatalogError, ExternalIdRecord, Scope};
use crate::core::entry::CatalogEntry;
use crate::core::types::EntryRef;
use crate::core::version::compare_optional;

/// Cache file format version
pub const CACHE_VERSION: &str = "1.0.0";

/// Default maximum age before the cache is refreshed
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read component cache {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write component cache {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid component cache: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to refresh component cache: {0}")]
    Catalog(#[from] CatalogError),
}

/// Where the cache lives and when to rebuild it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub max_age_days: i64,
    pub force_refresh: bool,
}

impl CacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            force_refresh: false,
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::days(self.max_age_days)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheData {
    version: String,
    created_at: DateTime<Utc>,
    releases: Vec<CatalogEntry>,
}

/// Snapshot of all catalog releases, sorted by name then newest version first
#[derive(Debug, Clone)]
pub struct ComponentCache {
    created_at: DateTime<Utc>,
    releases: Vec<CatalogEntry>,
    id_to_index: HashMap<EntryRef, usize>,
}

impl ComponentCache {
    /// Build a cache from releases; they are sorted on the way in
    pub fn from_releases(releases: Vec<CatalogEntry>, created_at: DateTime<Utc>) -> Self {
        let mut releases: Vec<CatalogEntry> =
            releases.into_iter().filter(CatalogEntry::is_release).collect();
        releases.sort_by(compare_releases);

        let id_to_index = releases
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id.clone(), idx))
            .collect();

        Self {
            created_at,
            releases,
            id_to_index,
        }
    }

    /// Fetch every release from the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    pub fn refresh(catalog: &dyn Catalog) -> Result<Self, CacheError> {
        let releases = catalog.all_releases()?;
        let cache = Self::from_releases(releases, Utc::now());
        info!("Refreshed component cache with {} releases", cache.len());
        Ok(cache)
    }

    /// Load a cache file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = std::fs::read_to_string(path).map_err(|source| CacheError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let data: CacheData = serde_json::from_str(&content)?;

        if data.version != CACHE_VERSION {
            warn!(
                "Component cache version mismatch (expected {}, found {})",
                CACHE_VERSION, data.version
            );
        }

        Ok(Self::from_releases(data.releases, data.created_at))
    }

    /// Write the cache file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let data = CacheData {
            version: CACHE_VERSION.to_string(),
            created_at: self.created_at,
            releases: self.releases.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(path, json).map_err(|source| CacheError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configured cache, refreshing it from `catalog` when it is
    /// missing, outdated or a refresh is forced.
    ///
    /// Without a catalog an outdated cache is used as is. Returns `None` if
    /// there is neither a cache file nor a catalog to build one from.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read, refreshed or saved.
    pub fn load_or_refresh(
        config: &CacheConfig,
        catalog: Option<&dyn Catalog>,
    ) -> Result<Option<Self>, CacheError> {
        let existing = if config.path.exists() && !config.force_refresh {
            Some(Self::load(&config.path)?)
        } else {
            None
        };

        match (existing, catalog) {
            (Some(cache), _) if !cache.is_outdated(config.max_age()) => Ok(Some(cache)),
            (_, Some(catalog)) => {
                let cache = Self::refresh(catalog)?;
                cache.save(&config.path)?;
                info!("Saved component cache to {}", config.path.display());
                Ok(Some(cache))
            }
            (Some(cache), None) => {
                warn!(
                    "Component cache {} is older than {} days, no catalog to refresh it from",
                    config.path.display(),
                    config.max_age_days
                );
                Ok(Some(cache))
            }
            (None, None) => Ok(None),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the snapshot is older than `max_age`
    pub fn is_outdated(&self, max_age: Duration) -> bool {
        Utc::now() - self.created_at > max_age
    }

    pub fn releases(&self) -> &[CatalogEntry] {
        &self.releases
    }

    /// Releases of one component, in cache order
    pub fn releases_of<'a>(
        &'a self,
        component: &'a EntryRef,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.releases
            .iter()
            .filter(move |r| r.component_id.as_ref() == Some(component))
    }

    pub fn get(&self, id: &EntryRef) -> Option<&CatalogEntry> {
        self.id_to_index.get(id).map(|&idx| &self.releases[idx])
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Lowercase name ascending, then version descending
fn compare_releases(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| {
            compare_optional(b.version.as_deref(), a.version.as_deref())
        })
}

/// The snapshot answers the release-level queries; it holds no components.
impl Catalog for ComponentCache {
    fn bulk_search_by_external_id(
        &self,
        id_name: &str,
        scope: Scope,
    ) -> Result<Vec<ExternalIdRecord>, CatalogError> {
        if scope == Scope::Component {
            return Ok(Vec::new());
        }
        Ok(self
            .releases
            .iter()
            .filter(|r| r.external_ids.contains_key(id_name))
            .map(|r| ExternalIdRecord {
                self_ref: r.id.clone(),
                external_ids: r.external_ids.clone(),
            })
            .collect())
    }

    fn get_entry_by_ref(&self, entry: &EntryRef) -> Result<CatalogEntry, CatalogError> {
        self.get(entry)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(entry.clone()))
    }

    fn search_by_name(&self, _name: &str) -> Result<Vec<EntryRef>, CatalogError> {
        Ok(Vec::new())
    }

    fn entry_has_clearing_artifact(&self, entry: &EntryRef) -> Result<bool, CatalogError> {
        self.get(entry)
            .map(|r| r.has_clearing_result)
            .ok_or_else(|| CatalogError::NotFound(entry.clone()))
    }

    fn all_releases(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.releases.clone())
    }
}

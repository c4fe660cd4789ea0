//! Operations this crate needs from a release catalog.
//!
//! The catalog is an external system of record. Anything that can answer the
//! queries of [`Catalog`] can back the matching engine: a live service
//! client, a [`JsonCatalog`](super::store::JsonCatalog) export, or the
//! [`ComponentCache`](super::cache::ComponentCache) snapshot.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::core::entry::CatalogEntry;
use crate::core::types::EntryRef;

/// Attempts made for a single entry fetch before a transient error surfaces
pub const MAX_FETCH_ATTEMPTS: usize = 3;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog authentication failed: {0}")]
    Unauthorized(String),

    #[error("Catalog entry not found: {0}")]
    NotFound(EntryRef),

    #[error("Catalog unreachable: {0}")]
    Unavailable(String),

    #[error("Transient catalog error: {0}")]
    Transient(String),

    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl CatalogError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Level at which an external id is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Component,
    Release,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// One hit of a bulk external-id search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdRecord {
    pub self_ref: EntryRef,
    pub external_ids: BTreeMap<String, String>,
}

/// Query interface of a release catalog
pub trait Catalog {
    /// All entries of the given scope carrying the external id `id_name`
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn bulk_search_by_external_id(
        &self,
        id_name: &str,
        scope: Scope,
    ) -> Result<Vec<ExternalIdRecord>, CatalogError>;

    /// Full detail of a single component or release
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown refs, or any access error.
    fn get_entry_by_ref(&self, entry: &EntryRef) -> Result<CatalogEntry, CatalogError>;

    /// Components whose name matches `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn search_by_name(&self, name: &str) -> Result<Vec<EntryRef>, CatalogError>;

    /// Whether a clearing report or license info is attached to the entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be fetched.
    fn entry_has_clearing_artifact(&self, entry: &EntryRef) -> Result<bool, CatalogError>;

    /// Every release with full detail, used to refresh the component cache
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn all_releases(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Fetch an entry, retrying transient failures.
///
/// # Errors
///
/// Returns the last error once [`MAX_FETCH_ATTEMPTS`] are used up, or the
/// first non-transient error.
pub fn fetch_entry(catalog: &dyn Catalog, entry: &EntryRef) -> Result<CatalogEntry, CatalogError> {
    let mut attempt = 1;
    loop {
        match catalog.get_entry_by_ref(entry) {
            Err(e) if e.is_transient() && attempt < MAX_FETCH_ATTEMPTS => {
                warn!(
                    "Fetching {} failed (attempt {}/{}): {}",
                    entry, attempt, MAX_FETCH_ATTEMPTS, e
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::catalog::client::{Catalog, CatalogError, ExternalIdRecord, Scope};
use crate::core::entry::CatalogEntry;
use crate::core::types::{EntryKind, EntryRef};

/// Catalog export format version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog export format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    #[serde(default)]
    pub components: Vec<CatalogEntry>,
    #[serde(default)]
    pub releases: Vec<CatalogEntry>,
}

/// An in-memory catalog loaded from a JSON export, with indexes
#[derive(Debug, Default)]
pub struct JsonCatalog {
    /// All components and releases
    pub entries: Vec<CatalogEntry>,

    /// Index: entry ID -> index in entries vec
    id_to_index: HashMap<EntryRef, usize>,

    /// Index: lowercase component name -> component indices
    name_to_components: HashMap<String, Vec<usize>>,
}

impl JsonCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION, data.version
            );
        }

        Ok(Self::from_entries(data.components, data.releases))
    }

    /// Build a catalog from components and releases.
    ///
    /// Components without an explicit release list get one derived from the
    /// releases' `component_id`.
    pub fn from_entries(components: Vec<CatalogEntry>, releases: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for mut component in components {
            component.kind = EntryKind::Component;
            catalog.add_entry(component);
        }
        for mut release in releases {
            release.kind = EntryKind::Release;
            catalog.add_entry(release);
        }
        catalog.link_releases();
        catalog
    }

    /// Add an entry to the catalog
    pub fn add_entry(&mut self, entry: CatalogEntry) {
        let index = self.entries.len();

        self.id_to_index.insert(entry.id.clone(), index);

        if entry.kind == EntryKind::Component {
            self.name_to_components
                .entry(entry.name.to_lowercase())
                .or_default()
                .push(index);
        }

        self.entries.push(entry);
    }

    fn link_releases(&mut self) {
        let mut derived: HashMap<EntryRef, Vec<EntryRef>> = HashMap::new();
        for release in self.entries.iter().filter(|e| e.is_release()) {
            if let Some(component_id) = &release.component_id {
                derived
                    .entry(component_id.clone())
                    .or_default()
                    .push(release.id.clone());
            }
        }

        for (component_id, releases) in derived {
            match self.id_to_index.get(&component_id) {
                Some(&idx) if self.entries[idx].releases.is_empty() => {
                    self.entries[idx].releases = releases;
                }
                Some(_) => {}
                None => warn!("Releases reference unknown component {}", component_id),
            }
        }
    }

    /// Get an entry by ID
    pub fn get(&self, id: &EntryRef) -> Option<&CatalogEntry> {
        self.id_to_index.get(id).map(|&idx| &self.entries[idx])
    }

    /// All releases, in insertion order
    pub fn releases(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_release())
    }

    /// All components, in insertion order
    pub fn components(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| !e.is_release())
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            components: self.components().cloned().collect(),
            releases: self.releases().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of entries in catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for JsonCatalog {
    fn bulk_search_by_external_id(
        &self,
        id_name: &str,
        scope: Scope,
    ) -> Result<Vec<ExternalIdRecord>, CatalogError> {
        let wanted = match scope {
            Scope::Component => EntryKind::Component,
            Scope::Release => EntryKind::Release,
        };
        Ok(self
            .entries
            .iter()
            .filter(|e| e.kind == wanted && e.external_ids.contains_key(id_name))
            .map(|e| ExternalIdRecord {
                self_ref: e.id.clone(),
                external_ids: e.external_ids.clone(),
            })
            .collect())
    }

    fn get_entry_by_ref(&self, entry: &EntryRef) -> Result<CatalogEntry, CatalogError> {
        self.get(entry)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(entry.clone()))
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<EntryRef>, CatalogError> {
        let needle = name.to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // Exact hits first, then substring hits in insertion order
        let mut hits: Vec<usize> = self
            .name_to_components
            .get(&needle)
            .cloned()
            .unwrap_or_default();
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.kind == EntryKind::Component
                && !hits.contains(&idx)
                && entry.name.to_lowercase().contains(&needle)
            {
                hits.push(idx);
            }
        }

        Ok(hits
            .into_iter()
            .map(|idx| self.entries[idx].id.clone())
            .collect())
    }

    fn entry_has_clearing_artifact(&self, entry: &EntryRef) -> Result<bool, CatalogError> {
        self.get(entry)
            .map(|e| e.has_clearing_result)
            .ok_or_else(|| CatalogError::NotFound(entry.clone()))
    }

    fn all_releases(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.releases().cloned().collect())
    }
}

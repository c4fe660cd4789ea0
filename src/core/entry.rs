use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::purl::{decode_purl_list, Purl};
use crate::core::types::{EntryKind, EntryRef};

/// External id key under which catalogs store package-urls
pub const PURL_EXTERNAL_ID: &str = "package-url";

/// A component or release record from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog id of this entry
    pub id: EntryRef,

    #[serde(default)]
    pub kind: EntryKind,

    /// Owning component (releases only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<EntryRef>,

    pub name: String,

    /// Release version; `None` for components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Raw external ids, e.g. `package-url` -> purl list
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub external_ids: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_file_hash: Option<String>,

    /// Whether a clearing report or license info is attached
    #[serde(default)]
    pub has_clearing_result: bool,

    /// Releases of a component
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<EntryRef>,
}

impl CatalogEntry {
    pub fn release(
        id: impl Into<String>,
        component_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryRef::new(id),
            kind: EntryKind::Release,
            component_id: Some(EntryRef::new(component_id)),
            name: name.into(),
            version: Some(version.into()),
            external_ids: BTreeMap::new(),
            source_file_name: None,
            source_file_hash: None,
            binary_file_name: None,
            binary_file_hash: None,
            has_clearing_result: false,
            releases: Vec::new(),
        }
    }

    pub fn component(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: EntryRef::new(id),
            kind: EntryKind::Component,
            component_id: None,
            name: name.into(),
            version: None,
            external_ids: BTreeMap::new(),
            source_file_name: None,
            source_file_hash: None,
            binary_file_name: None,
            binary_file_hash: None,
            has_clearing_result: false,
            releases: Vec::new(),
        }
    }

    /// Attach a package-url external id (appends to an existing list)
    #[must_use]
    pub fn with_purl(mut self, purl: &str) -> Self {
        let mut purls = self.purl_strings();
        purls.push(purl.to_string());
        let encoded = serde_json::to_string(&purls).unwrap_or_else(|_| purls.join(" "));
        self.external_ids
            .insert(PURL_EXTERNAL_ID.to_string(), encoded);
        self
    }

    #[must_use]
    pub fn with_source_file(mut self, name: Option<&str>, hash: Option<&str>) -> Self {
        self.source_file_name = name.map(str::to_string);
        self.source_file_hash = hash.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_binary_file(mut self, name: Option<&str>, hash: Option<&str>) -> Self {
        self.binary_file_name = name.map(str::to_string);
        self.binary_file_hash = hash.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_clearing_result(mut self, present: bool) -> Self {
        self.has_clearing_result = present;
        self
    }

    pub fn is_release(&self) -> bool {
        self.kind == EntryKind::Release
    }

    /// Raw package-url strings from the external ids
    pub fn purl_strings(&self) -> Vec<String> {
        self.external_ids
            .get(PURL_EXTERNAL_ID)
            .map(|v| decode_purl_list(v))
            .unwrap_or_default()
    }

    /// Package-urls of this entry; unparseable ones are skipped
    pub fn purls(&self) -> Vec<Purl> {
        self.purl_strings()
            .iter()
            .filter_map(|s| Purl::parse(s).ok())
            .collect()
    }

    /// Hashes present on this entry, source first
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        [&self.source_file_hash, &self.binary_file_hash]
            .into_iter()
            .filter_map(|h| h.as_deref())
            .filter(|h| !h.is_empty())
    }

    /// `name` or `name@version`, for log messages
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

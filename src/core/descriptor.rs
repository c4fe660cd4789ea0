use serde::{Deserialize, Serialize};

use crate::core::purl::Purl;
use crate::core::types::EntryRef;

/// One BOM entry to be reconciled against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Component name as written in the BOM
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Package-url of the component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<Purl>,

    /// Catalog release id, present when the BOM was mapped before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<EntryRef>,

    /// SHA-1 of the source archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_hash: Option<String>,

    /// SHA-1 of the binary archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_file_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_file_name: Option<String>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_purl(mut self, purl: Purl) -> Self {
        self.purl = Some(purl);
        self
    }

    #[must_use]
    pub fn with_catalog_id(mut self, id: EntryRef) -> Self {
        self.catalog_id = Some(id);
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

    /// `name` or `name@version`, for log messages
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }

    /// Hashes present on this descriptor, source first
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        [&self.source_file_hash, &self.binary_file_hash]
            .into_iter()
            .filter_map(|h| h.as_deref())
            .filter(|h| !h.is_empty())
    }
}

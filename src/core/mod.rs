//! Core data types for BOM mapping.
//!
//! - [`ComponentDescriptor`](descriptor::ComponentDescriptor): one BOM entry to reconcile
//! - [`CatalogEntry`](entry::CatalogEntry): a component or release record from the catalog
//! - [`Purl`](purl::Purl): a parsed package-url
//! - [`ComparableVersion`](version::ComparableVersion): ordering of free-form version strings
//! - [`EntryRef`](types::EntryRef), [`MatchCode`](types::MatchCode): ids and match classification
//!
//! ## Match codes
//!
//! | Code | Evidence |
//! |------|----------|
//! | `1-full-match-by-id` | catalog id or package-url |
//! | `2-full-match-by-hash` | source or binary file hash |
//! | `3-full-match-by-name-and-version` | name and version |
//! | `4-good-match-by-filename` | source file name |
//! | `5-candidate-match-by-name` | name only |
//! | `6-candidate-match-similar-component` | similar name |
//! | `9-no-match` | nothing |

pub mod descriptor;
pub mod entry;
pub mod purl;
pub mod types;
pub mod version;

//! Catalog access, the package-url index and the component cache.
//!
//! - [`Catalog`](client::Catalog): the queries mapping needs from a release catalog
//! - [`JsonCatalog`](store::JsonCatalog): a catalog loaded from a JSON export
//! - [`PurlIndex`](purl_index::PurlIndex): type → namespace → name → version lookup of purls
//! - [`CatalogQueryService`](query::CatalogQueryService): fills the index and answers purl searches
//! - [`ComponentCache`](cache::ComponentCache): on-disk snapshot of every release
//!
//! ## Example
//!
//! ```rust,no_run
//! use bom_mapper::catalog::cache::{CacheConfig, ComponentCache};
//! use bom_mapper::catalog::store::JsonCatalog;
//! use std::path::Path;
//!
//! let catalog = JsonCatalog::load_from_file(Path::new("catalog.json")).unwrap();
//! let config = CacheConfig::new("releases.cache.json");
//! let cache = ComponentCache::load_or_refresh(&config, Some(&catalog)).unwrap();
//! ```

pub mod cache;
pub mod client;
pub mod purl_index;
pub mod query;
pub mod store;

//! # bom-mapper
//!
//! A library for mapping the components of a bill of materials onto the
//! releases of a release catalog.
//!
//! A BOM lists components by name, version, package-url, file names and
//! hashes. The catalog, the system of record for cleared releases, spells
//! the same releases its own way. `bom-mapper` reconciles the two and
//! classifies every component by the strongest evidence found.
//!
//! ## Features
//!
//! - **Package-url index**: type/namespace/name/version lookup with qualifier filtering
//! - **Ordered evidence**: catalog id, hash, name and version, file name, name, similarity
//! - **Tie detection**: equally strong candidates are all reported
//! - **Version ordering**: free-form versions such as `v2.13.2.2` and `1.0~1`
//! - **Offline mapping**: against a periodically refreshed component cache
//!
//! ## Example
//!
//! ```rust,no_run
//! use bom_mapper::{ComponentCache, ComponentDescriptor, JsonCatalog, MatchingConfig,
//!     MatchingContext, MatchingEngine};
//! use std::path::Path;
//!
//! // Snapshot a catalog export
//! let catalog = JsonCatalog::load_from_file(Path::new("catalog.json")).unwrap();
//! let cache = ComponentCache::refresh(&catalog).unwrap();
//!
//! // Map offline against the snapshot
//! let engine = MatchingEngine::new(MatchingConfig::default());
//! let mut context = MatchingContext::new(None, Some(cache));
//! let results = engine
//!     .map_bom(&mut context, &[ComponentDescriptor::new("sed", Some("4.8"))])
//!     .unwrap();
//!
//! for r in results {
//!     println!("{}: {}", r.descriptor.label(), r.result);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog access, package-url index and component cache
//! - [`core`]: Descriptors, catalog entries, package-urls and versions
//! - [`matching`]: Matching engine, rules and result assembly
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::cache::ComponentCache;
pub use catalog::store::JsonCatalog;
pub use core::descriptor::ComponentDescriptor;
pub use core::entry::CatalogEntry;
pub use core::purl::Purl;
pub use core::types::*;
pub use core::version::ComparableVersion;
pub use matching::engine::{MappingError, MatchingConfig, MatchingContext, MatchingEngine};
pub use matching::result::MatchResult;

//! BOM component matching.
//!
//! - [`MatchingEngine`](engine::MatchingEngine): maps descriptors onto catalog releases
//! - [`MatchingContext`](engine::MatchingContext): catalog handle, purl index and cache for a run
//! - [`MatchResult`](result::MatchResult): best code and the candidates tied at it
//! - [`ResultAssembler`](assembler::ResultAssembler): annotated BOM and summary
//!
//! ## Matching Algorithm
//!
//! For each descriptor:
//!
//! 1. **Catalog id**: an id from a previous run that still names a release
//! 2. **Package-url**: a unique release is final; a unique component narrows
//!    the scan to its releases
//! 3. **Scan**: every candidate release gets the strongest code it earns:
//!    identifier, hash, name and version, source file name, name only,
//!    similar name. An ambiguous package-url does not count as an identifier
//! 4. **Accumulation**: weaker candidates are ignored, ties are kept and a
//!    stronger candidate replaces the list
//! 5. **Clearing filter**: optionally drop candidates without a clearing result
//!
//! ## Example
//!
//! ```rust,no_run
//! use bom_mapper::catalog::store::JsonCatalog;
//! use bom_mapper::core::descriptor::ComponentDescriptor;
//! use bom_mapper::matching::engine::{MatchingConfig, MatchingContext, MatchingEngine};
//! use std::path::Path;
//!
//! let catalog = JsonCatalog::load_from_file(Path::new("catalog.json")).unwrap();
//! let config = MatchingConfig { online: true, ..MatchingConfig::default() };
//!
//! let engine = MatchingEngine::new(config);
//! let mut context = MatchingContext::new(Some(&catalog), None);
//! let result = engine
//!     .map_descriptor(&mut context, &ComponentDescriptor::new("sed", Some("4.8")))
//!     .unwrap();
//!
//! println!("{}: {}", result.descriptor.label(), result.result);
//! ```

pub mod assembler;
pub mod engine;
pub mod result;
pub mod rules;

pub use assembler::{MapMode, ResultAssembler};
pub use engine::{MappingError, MatchingConfig, MatchingContext, MatchingEngine};
pub use result::{MatchCandidate, MatchResult};

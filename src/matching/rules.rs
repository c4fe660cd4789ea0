//! Per-entry matching rules.
//!
//! Each predicate compares one descriptor with one catalog entry.
//! [`classify`] applies them strongest first and reports the first that
//! fires, which is the strongest code the entry earns.

use std::collections::BTreeSet;

use crate::core::descriptor::ComponentDescriptor;
use crate::core::entry::CatalogEntry;
use crate::core::types::MatchCode;
use crate::matching::engine::MatchingConfig;
use crate::utils::validation::{
    name_words, normalize_file_name, normalize_hash, normalize_name, strip_debian_decorations,
};

/// Catalog id identifies the entry, or with `by_purl` a versioned
/// package-url of the same release
#[must_use]
pub fn matches_identifier(
    descriptor: &ComponentDescriptor,
    entry: &CatalogEntry,
    by_purl: bool,
) -> bool {
    if descriptor.catalog_id.as_ref() == Some(&entry.id) {
        return true;
    }
    by_purl
        && descriptor.purl.as_ref().is_some_and(|purl| {
            purl.version().is_some() && entry.purls().iter().any(|p| p.same_release(purl))
        })
}

/// Same name and same version, case-insensitive.
///
/// Versions are compared as strings, not by [`ComparableVersion`], because
/// catalogs spell versions their own way. With `relaxed_debian` a Debian
/// epoch and `debian` suffix are removed from both sides first.
///
/// [`ComparableVersion`]: crate::core::version::ComparableVersion
#[must_use]
pub fn matches_name_version(
    descriptor: &ComponentDescriptor,
    entry: &CatalogEntry,
    relaxed_debian: bool,
) -> bool {
    let (Some(wanted), Some(found)) = (&descriptor.version, &entry.version) else {
        return false;
    };
    if !matches_name(descriptor, entry) {
        return false;
    }

    if relaxed_debian {
        normalize_name(&strip_debian_decorations(wanted))
            == normalize_name(&strip_debian_decorations(found))
    } else {
        normalize_name(wanted) == normalize_name(found)
    }
}

/// Any source or binary hash of the descriptor equals one of the entry
#[must_use]
pub fn matches_hash(descriptor: &ComponentDescriptor, entry: &CatalogEntry) -> bool {
    let known: BTreeSet<String> = entry.hashes().filter_map(normalize_hash).collect();
    if known.is_empty() {
        return false;
    }
    descriptor
        .hashes()
        .filter_map(normalize_hash)
        .any(|hash| known.contains(&hash))
}

/// Same source archive file name
#[must_use]
pub fn matches_file_name(descriptor: &ComponentDescriptor, entry: &CatalogEntry) -> bool {
    match (&descriptor.source_file_name, &entry.source_file_name) {
        (Some(wanted), Some(found)) => {
            let wanted = normalize_file_name(wanted);
            !wanted.is_empty() && wanted == normalize_file_name(found)
        }
        _ => false,
    }
}

/// Same name, case-insensitive
#[must_use]
pub fn matches_name(descriptor: &ComponentDescriptor, entry: &CatalogEntry) -> bool {
    let wanted = normalize_name(&descriptor.name);
    !wanted.is_empty() && wanted == normalize_name(&entry.name)
}

/// Names sharing at least `min_shared` words once noise words are removed
#[must_use]
pub fn is_similar_name(a: &str, b: &str, noise_words: &[String], min_shared: usize) -> bool {
    let significant = |name: &str| -> BTreeSet<String> {
        name_words(name)
            .into_iter()
            .filter(|w| !noise_words.iter().any(|n| n.eq_ignore_ascii_case(w)))
            .collect()
    };

    let shared = significant(a).intersection(&significant(b)).count();
    shared > 0 && shared >= min_shared
}

/// Strongest evidence linking `descriptor` to `entry`: identifier, hash,
/// name and version, file name, name, similar name.
///
/// `purl_is_id` lets a shared package-url count as an identifier; it is
/// off once a package-url lookup has proved ambiguous. Name-only matches
/// are reported regardless of `allow_name_only`; the caller decides
/// whether to keep them. Similarity is only tried when enabled.
#[must_use]
pub fn classify(
    descriptor: &ComponentDescriptor,
    entry: &CatalogEntry,
    config: &MatchingConfig,
    purl_is_id: bool,
) -> MatchCode {
    if matches_identifier(descriptor, entry, purl_is_id) {
        MatchCode::FullById
    } else if matches_hash(descriptor, entry) {
        MatchCode::FullByHash
    } else if matches_name_version(descriptor, entry, config.relaxed_debian) {
        MatchCode::FullByNameVersion
    } else if matches_file_name(descriptor, entry) {
        MatchCode::ByFilename
    } else if matches_name(descriptor, entry) {
        MatchCode::ByName
    } else if config.similarity
        && is_similar_name(
            &descriptor.name,
            &entry.name,
            &config.similarity_noise_words,
            config.min_shared_words,
        )
    {
        MatchCode::BySimilarity
    } else {
        MatchCode::NoMatch
    }
}

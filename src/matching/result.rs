use serde::Serialize;

use crate::core::descriptor::ComponentDescriptor;
use crate::core::entry::CatalogEntry;
use crate::core::types::{EntryRef, MatchCode};

/// A catalog entry found for a descriptor, with the evidence that found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub entry: CatalogEntry,
    pub code: MatchCode,
}

/// Outcome of matching one descriptor
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// The descriptor that was matched
    pub descriptor: ComponentDescriptor,

    /// Best code achieved
    pub result: MatchCode,

    /// Every candidate tied at `result`, in scan order
    pub releases: Vec<MatchCandidate>,

    /// Distinct catalog refs a package-url resolved to when it was ambiguous
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub purl_conflicts: Vec<EntryRef>,
}

impl MatchResult {
    pub fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            descriptor,
            result: MatchCode::NoMatch,
            releases: Vec::new(),
            purl_conflicts: Vec::new(),
        }
    }

    /// Strongest code currently held, `NoMatch` when there are no candidates
    pub fn best_code(&self) -> MatchCode {
        self.releases
            .first()
            .map_or(MatchCode::NoMatch, |candidate| candidate.code)
    }

    /// Accumulate a candidate.
    ///
    /// Weaker candidates are ignored, equal ones are appended and stronger
    /// ones replace the whole list. `Invalid` and `NoMatch` are never kept,
    /// and an entry already listed is not added twice.
    ///
    /// Returns whether the candidate was kept.
    pub fn add_match_if_better(&mut self, entry: CatalogEntry, code: MatchCode) -> bool {
        if matches!(code, MatchCode::Invalid | MatchCode::NoMatch) {
            return false;
        }

        let best = self.best_code();
        if best.is_better_than(code) {
            return false;
        }
        if code.is_better_than(best) {
            self.releases.clear();
        } else if self.contains(&entry.id) {
            return false;
        }

        self.releases.push(MatchCandidate { entry, code });
        self.result = code;
        true
    }

    /// Whether `id` is among the candidates
    pub fn contains(&self, id: &EntryRef) -> bool {
        self.releases.iter().any(|c| &c.entry.id == id)
    }

    /// Drop the candidates for which `keep` is false; an emptied result
    /// becomes `NoMatch`
    pub fn retain_candidates(&mut self, mut keep: impl FnMut(&MatchCandidate) -> bool) {
        self.releases.retain(|c| keep(c));
        if self.releases.is_empty() {
            self.result = MatchCode::NoMatch;
        }
    }

    /// The single candidate, if there is exactly one
    pub fn unique_candidate(&self) -> Option<&MatchCandidate> {
        match self.releases.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn is_good_match(&self) -> bool {
        self.result.is_good_match() && !self.releases.is_empty()
    }
}

//! Turn match results into the mapped BOM and a summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::descriptor::ComponentDescriptor;
use crate::core::types::{EntryRef, MatchCode};
use crate::matching::result::MatchResult;

/// Which components end up in the mapped output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MapMode {
    /// Every component
    #[default]
    All,
    /// Only components with a full match
    Found,
    /// Only components without a full match
    NotFound,
}

impl MapMode {
    pub fn includes(self, result: &MatchResult) -> bool {
        match self {
            Self::All => true,
            Self::Found => result.is_good_match(),
            Self::NotFound => !result.is_good_match(),
        }
    }
}

/// One candidate as reported in the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub id: EntryRef,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub code: MatchCode,
}

/// A BOM component after mapping
#[derive(Debug, Clone, Serialize)]
pub struct MappedComponent {
    /// The descriptor, annotated when it was uniquely matched
    pub component: ComponentDescriptor,
    pub result: MatchCode,
    pub candidates: Vec<CandidateSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub purl_conflicts: Vec<EntryRef>,
}

/// Counts per match code over the whole BOM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub total: usize,
    pub counts: BTreeMap<MatchCode, usize>,
    /// Every component has a full match
    pub all_good: bool,
}

impl MappingSummary {
    pub fn count(&self, code: MatchCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub summary: MappingSummary,
    pub components: Vec<MappedComponent>,
}

/// Merges match results back into BOM components
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    mode: MapMode,
}

impl ResultAssembler {
    pub fn new(mode: MapMode) -> Self {
        Self { mode }
    }

    /// Summarize all results and keep the components selected by the mode
    pub fn assemble(&self, results: &[MatchResult]) -> MappingReport {
        let mut summary = MappingSummary {
            total: results.len(),
            all_good: results.iter().all(MatchResult::is_good_match),
            ..MappingSummary::default()
        };
        for result in results {
            *summary.counts.entry(result.result).or_insert(0) += 1;
        }

        let components = results
            .iter()
            .filter(|r| self.mode.includes(r))
            .map(|r| MappedComponent {
                component: annotate(r),
                result: r.result,
                candidates: r
                    .releases
                    .iter()
                    .map(|c| CandidateSummary {
                        id: c.entry.id.clone(),
                        name: c.entry.name.clone(),
                        version: c.entry.version.clone(),
                        code: c.code,
                    })
                    .collect(),
                purl_conflicts: r.purl_conflicts.clone(),
            })
            .collect();

        MappingReport {
            summary,
            components,
        }
    }
}

/// Copy of the descriptor carrying the catalog id of a unique full match,
/// and the release's purl when the descriptor had none and the release has
/// exactly one
pub fn annotate(result: &MatchResult) -> ComponentDescriptor {
    let mut descriptor = result.descriptor.clone();
    if !result.is_good_match() {
        return descriptor;
    }
    let Some(candidate) = result.unique_candidate() else {
        return descriptor;
    };

    descriptor.catalog_id = Some(candidate.entry.id.clone());
    if descriptor.purl.is_none() {
        if let [purl] = candidate.entry.purls().as_slice() {
            descriptor.purl = Some(purl.clone());
        }
    }
    descriptor
}

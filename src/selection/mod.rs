pub mod aggregation;
pub mod candidate;
pub mod filters;
pub mod outliers;
pub mod ranking;
pub mod scoring;
mod summary;
mod v1_1;
mod v1_3;

use tracing::debug;

use crate::types::{Comp, CompKind, SelectionPolicy, SelectionResult, SelectionVersion, Subject};
pub use aggregation::{aggregate, value_basis, Aggregate};
pub use candidate::{missing_subject_warnings, ScoredComp, SelectionContext};
pub use filters::{screen_exact, screen_grouped, FilterOutcome};
pub use outliers::{iqr_bounds, ppsf_bounds, remove_blunt, remove_guarded, OutlierPass};
pub use ranking::{rank, selection_count, RankingChain};
pub use scoring::{ScoreComponents, ScoringWindows, SimilarityScorer, WeightedFactorScorer};
pub use v1_1::SelectionV1_1;
pub use v1_3::SelectionV1_3;

/// Everything one selection run reads. Borrowed; the engine never mutates
/// caller data.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub subject: &'a Subject,
    pub comps: &'a [Comp],
    pub policy: &'a SelectionPolicy,
    pub min_closed_comps_required: usize,
    pub comp_kind: CompKind,
}

/// One frozen selection algorithm.
///
/// Implementations are pure: the same request always yields the same
/// result, independent of comp order.
pub trait SelectionAlgorithm {
    fn version(&self) -> SelectionVersion;

    fn select(&self, request: &SelectionRequest<'_>) -> SelectionResult;
}

pub fn algorithm_for(version: SelectionVersion) -> &'static dyn SelectionAlgorithm {
    match version {
        SelectionVersion::V1_1 => &SelectionV1_1,
        SelectionVersion::V1_3 => &SelectionV1_3,
    }
}

/// Select comps and estimate ARV for a subject.
///
/// Version resolution: `version` argument, then `policy.selection_version`,
/// then `selection_v1_1`.
pub fn run_valuation_selection(
    subject: &Subject,
    comps: &[Comp],
    policy: &SelectionPolicy,
    min_closed_comps_required: usize,
    comp_kind: CompKind,
    version: Option<SelectionVersion>,
) -> SelectionResult {
    let algorithm = algorithm_for(SelectionVersion::resolve(version, policy));
    debug!(
        version = %algorithm.version(),
        candidates = comps.len(),
        "running valuation selection"
    );

    let request = SelectionRequest {
        subject,
        comps,
        policy,
        min_closed_comps_required,
        comp_kind,
    };
    algorithm.select(&request)
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numeric::EvidenceSource;
use crate::selection::scoring::ScoreComponents;
use crate::types::codes::{ExclusionReason, MismatchSignal, Relaxation, WarningCode};
use crate::types::comp::{Comp, CompKind};
use crate::types::identifiers::CompId;
use crate::types::policy::{
    FactorWeights, OutlierConfig, RangeMethod, SelectionMethod, SelectionVersion,
    SimilarityFilters,
};

/// The final result of one selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub suggested_arv: Option<f64>,
    pub suggested_arv_range_low: Option<f64>,
    pub suggested_arv_range_high: Option<f64>,

    /// In rank order.
    pub selected_comp_ids: Vec<CompId>,
    pub selected_comps: Vec<SelectedComp>,

    /// Sorted and deduplicated.
    pub warning_codes: Vec<WarningCode>,
    pub selection_summary: SelectionSummary,

    pub comp_kind_used: CompKind,
    pub selection_version: SelectionVersion,
    /// Only produced by `selection_v1_3`.
    pub diagnostics: Option<SelectionDiagnostics>,
}

/// A selected comp, enriched with what the engine derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedComp {
    pub id: CompId,
    pub score: f64,
    /// Per-factor similarity behind `score`.
    pub components: ScoreComponents,
    pub ppsf: Option<f64>,
    pub days_old: Option<f64>,
    pub abs_sqft_delta_pct: Option<f64>,
    pub evidence: EvidenceTrail,
    /// The caller's record, unchanged.
    pub comp: Comp,
}

/// Which input field each fallback-resolved value came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceTrail {
    pub price: Option<EvidenceSource>,
    pub sale_date: Option<EvidenceSource>,
    pub days_old: Option<EvidenceSource>,
    pub property_type: Option<EvidenceSource>,
}

/// Audit trace of a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub algorithm_version: SelectionVersion,
    pub policy_used: PolicyUsed,
    pub candidate_counts: CandidateCounts,
    /// As requested by the caller.
    pub min_closed_comps_required: usize,
    /// `max(1, min_closed_comps_required, arv_comp_use_count)`.
    pub min_required: usize,
    pub filters: FilterSummary,
    pub failsoft: FailsoftSummary,
    pub soft_penalties: SoftPenalties,
    pub outliers: OutlierSummary,
    /// Top 25 of the ranked pool.
    pub ranking: Vec<RankingEntry>,
    pub selected: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyUsed {
    pub closed_sales_target_priced: Option<f64>,
    pub arv_comp_use_count: usize,
    pub selection_method: SelectionMethod,
    pub range_method: RangeMethod,
    pub similarity_filters: SimilarityFilters,
    pub outlier_ppsf: OutlierConfig,
    pub weights: Option<FactorWeights>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCounts {
    pub total: usize,
    pub after_filters: usize,
    pub after_outliers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub reasons_count: BTreeMap<ExclusionReason, usize>,
    pub missing_subject: Vec<WarningCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailsoftReason {
    ZeroAfterFilters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailsoftSummary {
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailsoftReason>,
}

impl FailsoftSummary {
    pub fn not_applied() -> Self {
        Self {
            applied: false,
            reason: None,
        }
    }

    pub fn zero_after_filters() -> Self {
        Self {
            applied: true,
            reason: Some(FailsoftReason::ZeroAfterFilters),
        }
    }
}

/// Which subject attributes were available to the soft similarity factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftPenalties {
    pub beds_used: bool,
    pub baths_used: bool,
    pub year_used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub low: f64,
    pub high: f64,
}

impl OutlierBounds {
    pub fn contains(&self, ppsf: f64) -> bool {
        ppsf >= self.low && ppsf <= self.high
    }

    /// Distance outside the bounds; 0 inside.
    pub fn deviation(&self, ppsf: f64) -> f64 {
        if ppsf < self.low {
            self.low - ppsf
        } else if ppsf > self.high {
            ppsf - self.high
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub method: String,
    /// Sorted by id.
    pub removed_ids: Vec<CompId>,
    pub bounds: Option<OutlierBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub comp_id: CompId,
    pub kind: Option<CompKind>,
    pub score: f64,
    pub distance_miles: Option<f64>,
    pub days_old: Option<f64>,
    pub ppsf: Option<f64>,
    pub abs_sqft_delta_pct: Option<f64>,
    pub source_stage_name: Option<String>,
    pub excluded_reason: Option<ExclusionReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatch_signals: Vec<MismatchSignal>,
}

/// Extended audit output of `selection_v1_3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDiagnostics {
    pub version: SelectionVersion,
    pub counts: DiagnosticCounts,
    pub filters: DiagnosticFilters,
    pub outliers: DiagnosticOutliers,
    pub warnings: Vec<WarningCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticCounts {
    pub total_candidates: usize,
    pub after_filters: usize,
    pub after_outlier_checks: usize,
    pub selected: usize,
    pub min_required: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticFilters {
    pub reasons_count: BTreeMap<ExclusionReason, usize>,
    pub missing_subject: Vec<WarningCode>,
    /// Sorted and deduplicated.
    pub relaxations: Vec<Relaxation>,
    pub applied: AppliedFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub similarity_filters: SimilarityFilters,
    pub outlier_ppsf: OutlierConfig,
    pub distance_window: f64,
    pub recency_window: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticOutliers {
    pub method: String,
    pub bounds: Option<OutlierBounds>,
    /// Sorted by comp id.
    pub flagged: Vec<FlaggedOutlier>,
    pub removed_ids: Vec<CompId>,
}

/// A comp whose PPSF fell outside the IQR bounds, and what the guard did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedOutlier {
    pub comp_id: CompId,
    pub ppsf: Option<f64>,
    /// Sorted.
    pub secondary_signals: Vec<MismatchSignal>,
    pub kept_due_to_minimum: bool,
    pub removed: bool,
}

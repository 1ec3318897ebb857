use std::collections::{BTreeMap, BTreeSet};

use crate::numeric::safe_number;
use crate::selection::aggregation::Aggregate;
use crate::selection::candidate::{ScoredComp, SelectionContext};
use crate::selection::SelectionRequest;
use crate::types::{
    CandidateCounts, ExclusionReason, FailsoftSummary, FilterSummary, OutlierSummary, PolicyUsed,
    RankingEntry, SelectedComp, SelectionDiagnostics, SelectionResult, SelectionSummary,
    SelectionVersion, SoftPenalties, WarningCode,
};

const RANKING_SNAPSHOT_LIMIT: usize = 25;

/// Everything a version has decided, ready to be turned into output.
pub(crate) struct Outcome<'a> {
    pub version: SelectionVersion,
    pub reasons_count: BTreeMap<ExclusionReason, usize>,
    pub after_filters: usize,
    pub ranked: Vec<ScoredComp<'a>>,
    pub selected_len: usize,
    pub aggregate: Aggregate,
    pub warnings: BTreeSet<WarningCode>,
    pub failsoft: FailsoftSummary,
    pub outliers: OutlierSummary,
    pub diagnostics: Option<SelectionDiagnostics>,
}

pub(crate) fn ranking_entry(c: &ScoredComp<'_>) -> RankingEntry {
    RankingEntry {
        comp_id: c.resolved_id.clone(),
        kind: c.comp.comp_kind,
        score: c.score,
        distance_miles: c.distance_miles(),
        days_old: c.days_old_value(),
        ppsf: c.ppsf,
        abs_sqft_delta_pct: c.abs_sqft_delta_pct,
        source_stage_name: c.comp.source_stage_name.clone(),
        excluded_reason: c.exclusion,
        mismatch_signals: c.signals.clone(),
    }
}

pub(crate) fn selected_comp(c: &ScoredComp<'_>) -> SelectedComp {
    SelectedComp {
        id: c.resolved_id.clone(),
        score: c.score,
        components: c.components,
        ppsf: c.ppsf,
        days_old: c.days_old_value(),
        abs_sqft_delta_pct: c.abs_sqft_delta_pct,
        evidence: c.evidence.clone(),
        comp: c.comp.clone(),
    }
}

pub(crate) fn policy_used(ctx: &SelectionContext<'_>) -> PolicyUsed {
    let policy = ctx.policy;
    PolicyUsed {
        closed_sales_target_priced: policy.closed_sales_target_priced,
        arv_comp_use_count: ctx.use_count,
        selection_method: policy.effective_selection_method(),
        range_method: policy.effective_range_method(),
        similarity_filters: policy.similarity_filters.clone(),
        outlier_ppsf: policy.outlier_ppsf.clone(),
        weights: policy.weights.clone(),
    }
}

pub(crate) fn finish(
    ctx: &SelectionContext<'_>,
    request: &SelectionRequest<'_>,
    outcome: Outcome<'_>,
) -> SelectionResult {
    let selected = &outcome.ranked[..outcome.selected_len];
    let subject = ctx.subject;

    let summary = SelectionSummary {
        algorithm_version: outcome.version,
        policy_used: policy_used(ctx),
        candidate_counts: CandidateCounts {
            total: request.comps.len(),
            after_filters: outcome.after_filters,
            after_outliers: outcome.ranked.len(),
        },
        min_closed_comps_required: ctx.min_closed_comps_required,
        min_required: ctx.min_required(),
        filters: FilterSummary {
            reasons_count: outcome.reasons_count,
            missing_subject: ctx.missing_subject.clone(),
        },
        failsoft: outcome.failsoft,
        soft_penalties: SoftPenalties {
            beds_used: safe_number(subject.beds).is_some(),
            baths_used: safe_number(subject.baths).is_some(),
            year_used: safe_number(subject.year_built).is_some(),
        },
        outliers: outcome.outliers,
        ranking: outcome
            .ranked
            .iter()
            .take(RANKING_SNAPSHOT_LIMIT)
            .map(ranking_entry)
            .collect(),
        selected: selected.iter().map(ranking_entry).collect(),
    };

    SelectionResult {
        suggested_arv: outcome.aggregate.suggested_arv,
        suggested_arv_range_low: outcome.aggregate.range_low,
        suggested_arv_range_high: outcome.aggregate.range_high,
        selected_comp_ids: selected.iter().map(|c| c.resolved_id.clone()).collect(),
        selected_comps: selected.iter().map(selected_comp).collect(),
        warning_codes: outcome.warnings.into_iter().collect(),
        selection_summary: summary,
        comp_kind_used: request.comp_kind,
        selection_version: outcome.version,
        diagnostics: outcome.diagnostics,
    }
}

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::selection::aggregation::aggregate;
use crate::selection::candidate::{ScoredComp, SelectionContext};
use crate::selection::filters::{exclusion_counts, passed, relax_sqft, screen_grouped};
use crate::selection::outliers::{ppsf_bounds, remove_guarded, OutlierPass};
use crate::selection::ranking::{rank, selection_count, RankingChain};
use crate::selection::summary::{finish, Outcome};
use crate::selection::{SelectionAlgorithm, SelectionRequest};
use crate::types::{
    AppliedFilters, DiagnosticCounts, DiagnosticFilters, DiagnosticOutliers, FailsoftSummary,
    MismatchSignal, OutlierSummary, Relaxation, SelectionDiagnostics, SelectionResult,
    SelectionVersion, WarningCode,
};

/// `selection_v1_3`: grouped type matching, soft mismatch signals, and an
/// outlier guard that needs secondary evidence and respects the minimum
/// comp count.
///
/// Frozen. Behaviour changes belong in a new version.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionV1_3;

impl SelectionAlgorithm for SelectionV1_3 {
    fn version(&self) -> SelectionVersion {
        SelectionVersion::V1_3
    }

    fn select(&self, request: &SelectionRequest<'_>) -> SelectionResult {
        let ctx = SelectionContext::new(request);
        let policy = ctx.policy;
        let min_required = ctx.min_required();

        // 1. Scoring, hard filters and soft signals
        let candidates: Vec<ScoredComp> = request
            .comps
            .iter()
            .map(|comp| {
                let mut candidate = ScoredComp::assess(&ctx, comp);
                let outcome = screen_grouped(&ctx, &candidate);
                candidate.apply(outcome);
                candidate
            })
            .collect();

        let reasons_count = exclusion_counts(&candidates);
        let mut pool = passed(&candidates);

        // 2. Guarded outliers
        let bounds = ppsf_bounds(&pool, &policy.outlier_ppsf);
        let mut pass = match &bounds {
            Some(bounds) => remove_guarded(&pool, bounds, min_required),
            None => OutlierPass::untouched(&pool),
        };

        // 3. Fail-soft
        let mut warnings: BTreeSet<WarningCode> = ctx.missing_subject.iter().copied().collect();
        let mut relaxations: BTreeSet<Relaxation> = pass.relaxations.iter().copied().collect();
        let mut failsoft = FailsoftSummary::not_applied();
        if pass.kept.is_empty() && pool.is_empty() && !candidates.is_empty() {
            pool = relax_sqft(&candidates);
            pass.kept = pool.clone();
            warnings.insert(WarningCode::FailsoftZeroAfterFilters);
            relaxations.insert(Relaxation::SqftFilterRelaxed);
            failsoft = FailsoftSummary::zero_after_filters();
            warn!(
                candidates = candidates.len(),
                relaxed_pool = pool.len(),
                "all candidates filtered out; sqft limit relaxed"
            );
        }

        if candidates
            .iter()
            .any(|c| c.signals.contains(&MismatchSignal::PropertyTypeGroupMatchSfrTownhome))
        {
            warnings.insert(WarningCode::PropertyTypeGroupMatchSfrTownhome);
        }

        debug!(
            version = %SelectionVersion::V1_3,
            total = candidates.len(),
            after_filters = pool.len(),
            after_outliers = pass.kept.len(),
            flagged = pass.flagged.len(),
            removed = pass.removed_ids.len(),
            min_required,
            "selection pool resolved"
        );

        // 4. Ranking and selection
        let ranked = rank(pass.kept, RankingChain::DaysOld);
        let selected_len = selection_count(ranked.len(), ctx.use_count);

        // 5. Aggregation
        let aggregate = aggregate(
            &ranked[..selected_len],
            ctx.subject.sqft,
            policy.effective_selection_method(),
            policy.effective_range_method(),
        );

        let method = policy.outlier_ppsf.method_name().to_string();
        let diagnostics = SelectionDiagnostics {
            version: SelectionVersion::V1_3,
            counts: DiagnosticCounts {
                total_candidates: candidates.len(),
                after_filters: pool.len(),
                after_outlier_checks: ranked.len(),
                selected: selected_len,
                min_required,
            },
            filters: DiagnosticFilters {
                reasons_count: reasons_count.clone(),
                missing_subject: ctx.missing_subject.clone(),
                relaxations: relaxations.into_iter().collect(),
                applied: AppliedFilters {
                    similarity_filters: policy.similarity_filters.clone(),
                    outlier_ppsf: policy.outlier_ppsf.clone(),
                    distance_window: ctx.windows.distance_miles,
                    recency_window: ctx.windows.recency_days,
                },
            },
            outliers: DiagnosticOutliers {
                method: method.clone(),
                bounds,
                flagged: pass.flagged,
                removed_ids: pass.removed_ids.clone(),
            },
            warnings: warnings.iter().copied().collect(),
        };

        finish(
            &ctx,
            request,
            Outcome {
                version: SelectionVersion::V1_3,
                reasons_count,
                after_filters: pool.len(),
                ranked,
                selected_len,
                aggregate,
                warnings,
                failsoft,
                outliers: OutlierSummary {
                    method,
                    removed_ids: pass.removed_ids,
                    bounds,
                },
                diagnostics: Some(diagnostics),
            },
        )
    }
}

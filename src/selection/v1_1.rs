use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::selection::aggregation::aggregate;
use crate::selection::candidate::{ScoredComp, SelectionContext};
use crate::selection::filters::{exclusion_counts, passed, relax_sqft, screen_exact};
use crate::selection::outliers::{ppsf_bounds, remove_blunt, OutlierPass};
use crate::selection::ranking::{rank, selection_count, RankingChain};
use crate::selection::summary::{finish, Outcome};
use crate::selection::{SelectionAlgorithm, SelectionRequest};
use crate::types::{
    FailsoftSummary, OutlierSummary, SelectionResult, SelectionVersion, WarningCode,
};

/// `selection_v1_1`: exact type matching and blunt IQR removal.
///
/// Frozen. Behaviour changes belong in a new version.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionV1_1;

impl SelectionAlgorithm for SelectionV1_1 {
    fn version(&self) -> SelectionVersion {
        SelectionVersion::V1_1
    }

    fn select(&self, request: &SelectionRequest<'_>) -> SelectionResult {
        let ctx = SelectionContext::new(request);
        let policy = ctx.policy;

        // 1. Scoring and hard filters
        let candidates: Vec<ScoredComp> = request
            .comps
            .iter()
            .map(|comp| {
                let mut candidate = ScoredComp::assess(&ctx, comp);
                let outcome = screen_exact(&ctx, &candidate);
                candidate.apply(outcome);
                candidate
            })
            .collect();

        let reasons_count = exclusion_counts(&candidates);
        let mut pool = passed(&candidates);

        // 2. Outliers
        let bounds = ppsf_bounds(&pool, &policy.outlier_ppsf);
        let mut pass = match &bounds {
            Some(bounds) => remove_blunt(&pool, bounds),
            None => OutlierPass::untouched(&pool),
        };

        // 3. Fail-soft
        let mut warnings: BTreeSet<WarningCode> = ctx.missing_subject.iter().copied().collect();
        let mut failsoft = FailsoftSummary::not_applied();
        if pass.kept.is_empty() && pool.is_empty() && !candidates.is_empty() {
            pool = relax_sqft(&candidates);
            pass.kept = pool.clone();
            warnings.insert(WarningCode::FailsoftZeroAfterFilters);
            failsoft = FailsoftSummary::zero_after_filters();
            warn!(
                candidates = candidates.len(),
                relaxed_pool = pool.len(),
                "all candidates filtered out; sqft limit relaxed"
            );
        }

        debug!(
            version = %SelectionVersion::V1_1,
            total = candidates.len(),
            after_filters = pool.len(),
            after_outliers = pass.kept.len(),
            removed = pass.removed_ids.len(),
            "selection pool resolved"
        );

        // 4. Ranking and selection
        let ranked = rank(pass.kept, RankingChain::SaleDate);
        let selected_len = selection_count(ranked.len(), ctx.use_count);

        // 5. Aggregation
        let aggregate = aggregate(
            &ranked[..selected_len],
            ctx.subject.sqft,
            policy.effective_selection_method(),
            policy.effective_range_method(),
        );

        finish(
            &ctx,
            request,
            Outcome {
                version: SelectionVersion::V1_1,
                reasons_count,
                after_filters: pool.len(),
                ranked,
                selected_len,
                aggregate,
                warnings,
                failsoft,
                outliers: OutlierSummary {
                    method: policy.outlier_ppsf.method_name().to_string(),
                    removed_ids: pass.removed_ids,
                    bounds,
                },
                diagnostics: None,
            },
        )
    }
}

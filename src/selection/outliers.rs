use std::collections::BTreeSet;

use tracing::trace;

use crate::numeric::nearest_rank_quantile;
use crate::selection::candidate::ScoredComp;
use crate::types::{
    CompId, FlaggedOutlier, MismatchSignal, OutlierBounds, OutlierConfig, Relaxation,
};

/// `[Q1 - k*IQR, Q3 + k*IQR]` with nearest-rank quartiles.
pub fn iqr_bounds(samples: &[f64], k: f64) -> Option<OutlierBounds> {
    let q1 = nearest_rank_quantile(samples, 0.25)?;
    let q3 = nearest_rank_quantile(samples, 0.75)?;
    let iqr = q3 - q1;
    Some(OutlierBounds {
        low: q1 - k * iqr,
        high: q3 + k * iqr,
    })
}

/// PPSF bounds for the filtered pool, or `None` when the detector is off or
/// fewer than `min_samples` comps carry a PPSF.
pub fn ppsf_bounds(pool: &[ScoredComp<'_>], config: &OutlierConfig) -> Option<OutlierBounds> {
    if !config.is_enabled() {
        return None;
    }
    let samples: Vec<f64> = pool.iter().filter_map(|c| c.ppsf).collect();
    if samples.len() < config.min_samples() {
        return None;
    }
    iqr_bounds(&samples, config.k())
}

/// Result of an outlier pass over the filtered pool.
#[derive(Debug, Clone)]
pub struct OutlierPass<'a> {
    /// Survivors, in pool order.
    pub kept: Vec<ScoredComp<'a>>,
    /// Sorted.
    pub removed_ids: Vec<CompId>,
    /// Sorted by comp id. Only the guarded pass flags without removing.
    pub flagged: Vec<FlaggedOutlier>,
    pub relaxations: Vec<Relaxation>,
}

impl<'a> OutlierPass<'a> {
    /// No bounds were computed; everything survives.
    pub fn untouched(pool: &[ScoredComp<'a>]) -> Self {
        Self {
            kept: pool.to_vec(),
            removed_ids: Vec::new(),
            flagged: Vec::new(),
            relaxations: Vec::new(),
        }
    }
}

/// Blunt removal (`selection_v1_1`): any priced comp outside the bounds goes.
/// Comps without a PPSF are never outliers.
pub fn remove_blunt<'a>(pool: &[ScoredComp<'a>], bounds: &OutlierBounds) -> OutlierPass<'a> {
    let mut kept = Vec::with_capacity(pool.len());
    let mut removed_ids = Vec::new();

    for candidate in pool {
        match candidate.ppsf {
            Some(ppsf) if !bounds.contains(ppsf) => removed_ids.push(candidate.resolved_id.clone()),
            _ => kept.push(candidate.clone()),
        }
    }
    removed_ids.sort();

    OutlierPass {
        kept,
        removed_ids,
        flagged: Vec::new(),
        relaxations: Vec::new(),
    }
}

struct FlaggedCandidate<'c> {
    comp_id: &'c CompId,
    content_key: &'c str,
    ppsf: f64,
    deviation: f64,
    score: f64,
    secondary_signals: Vec<MismatchSignal>,
}

/// Guarded removal (`selection_v1_3`).
///
/// A comp outside the bounds is removed only when it carries at least one
/// secondary mismatch signal and the pool keeps at least `min_required`
/// comps afterwards. Candidates with signals are considered first, worst
/// deviation first, so the minimum guard spends its budget on the clearest
/// outliers.
pub fn remove_guarded<'a>(
    pool: &[ScoredComp<'a>],
    bounds: &OutlierBounds,
    min_required: usize,
) -> OutlierPass<'a> {
    let mut flagged: Vec<FlaggedCandidate<'_>> = pool
        .iter()
        .filter_map(|c| {
            let ppsf = c.ppsf.filter(|p| !bounds.contains(*p))?;
            Some(FlaggedCandidate {
                comp_id: &c.resolved_id,
                content_key: &c.content_key,
                ppsf,
                deviation: bounds.deviation(ppsf),
                score: c.score,
                secondary_signals: c.secondary_signals(),
            })
        })
        .collect();

    flagged.sort_by(|a, b| {
        let a_eligible = !a.secondary_signals.is_empty();
        let b_eligible = !b.secondary_signals.is_empty();
        b_eligible
            .cmp(&a_eligible)
            .then_with(|| b.deviation.total_cmp(&a.deviation))
            .then_with(|| a.score.total_cmp(&b.score))
            .then_with(|| a.comp_id.cmp(b.comp_id))
            .then_with(|| a.content_key.cmp(b.content_key))
    });

    let mut keep: BTreeSet<&CompId> = pool.iter().map(|c| &c.resolved_id).collect();
    let mut records = Vec::with_capacity(flagged.len());
    let mut relaxations = Vec::new();

    for candidate in flagged {
        if !keep.contains(candidate.comp_id) {
            continue;
        }

        let has_secondary = !candidate.secondary_signals.is_empty();
        let would_drop_below = keep.len() <= min_required;

        let (kept_due_to_minimum, removed) = if !has_secondary {
            relaxations.push(Relaxation::OutlierSecondarySignalMissing);
            (false, false)
        } else if would_drop_below {
            relaxations.push(Relaxation::OutlierGuardMinRequired);
            (true, false)
        } else {
            keep.remove(candidate.comp_id);
            (false, true)
        };

        trace!(
            comp_id = %candidate.comp_id,
            ppsf = candidate.ppsf,
            removed,
            kept_due_to_minimum,
            "ppsf outlier flagged"
        );

        records.push(FlaggedOutlier {
            comp_id: candidate.comp_id.clone(),
            ppsf: Some(candidate.ppsf),
            secondary_signals: candidate.secondary_signals,
            kept_due_to_minimum,
            removed,
        });
    }

    // Stable: records sharing an id stay in decision order.
    records.sort_by(|a, b| a.comp_id.cmp(&b.comp_id));

    let mut removed_ids: Vec<CompId> = records
        .iter()
        .filter(|r| r.removed)
        .map(|r| r.comp_id.clone())
        .collect();
    removed_ids.sort();

    let kept = pool
        .iter()
        .filter(|c| keep.contains(&c.resolved_id))
        .cloned()
        .collect();

    OutlierPass {
        kept,
        removed_ids,
        flagged: records,
        relaxations,
    }
}

use std::cmp::Ordering;

use crate::selection::candidate::ScoredComp;

/// Total tie-break chains. Every chain ends on the resolved id and then the
/// canonical record, so ranking never depends on input order. Comps equal
/// under a chain are identical records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingChain {
    /// score desc, distance asc, sale date desc, |sqft delta| asc, id asc,
    /// record asc
    SaleDate,
    /// score desc, distance asc, days old asc, sale date desc,
    /// |sqft delta| asc, id asc, record asc
    DaysOld,
}

impl RankingChain {
    pub fn compare(&self, a: &ScoredComp<'_>, b: &ScoredComp<'_>) -> Ordering {
        let by_score = b.score.total_cmp(&a.score);
        let by_distance = || distance_key(a).total_cmp(&distance_key(b));
        let by_sale_date = || sale_key(b).cmp(&sale_key(a));
        let by_sqft = || sqft_key(a).total_cmp(&sqft_key(b));
        let by_id = || a.resolved_id.cmp(&b.resolved_id);
        let by_content = || a.content_key.cmp(&b.content_key);

        match self {
            RankingChain::SaleDate => by_score
                .then_with(by_distance)
                .then_with(by_sale_date)
                .then_with(by_sqft)
                .then_with(by_id)
                .then_with(by_content),
            RankingChain::DaysOld => by_score
                .then_with(by_distance)
                .then_with(|| days_key(a).total_cmp(&days_key(b)))
                .then_with(by_sale_date)
                .then_with(by_sqft)
                .then_with(by_id)
                .then_with(by_content),
        }
    }
}

// Missing distance, age and size delta sort last; a missing sale date sorts
// as the epoch.
fn distance_key(c: &ScoredComp<'_>) -> f64 {
    c.distance_miles().unwrap_or(f64::INFINITY)
}

fn days_key(c: &ScoredComp<'_>) -> f64 {
    c.days_old_value().unwrap_or(f64::INFINITY)
}

fn sale_key(c: &ScoredComp<'_>) -> i64 {
    c.sale_timestamp.unwrap_or(0)
}

fn sqft_key(c: &ScoredComp<'_>) -> f64 {
    c.abs_sqft_delta_pct.unwrap_or(f64::INFINITY)
}

pub fn rank<'a>(mut pool: Vec<ScoredComp<'a>>, chain: RankingChain) -> Vec<ScoredComp<'a>> {
    pool.sort_by(|a, b| chain.compare(a, b));

    debug_assert!(pool
        .windows(2)
        .all(|w| chain.compare(&w[0], &w[1]) != Ordering::Greater));

    pool
}

/// `min(use_count, pool)`, but at least one whenever the pool is non-empty.
pub fn selection_count(pool_len: usize, use_count: usize) -> usize {
    if pool_len == 0 {
        0
    } else {
        use_count.clamp(1, pool_len)
    }
}

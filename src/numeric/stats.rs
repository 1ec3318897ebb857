/// Nearest-rank quantile: index `ceil(p * n) - 1`, clamped into the slice.
///
/// Input order does not matter; values are sorted with a total order first.
pub fn nearest_rank_quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() as i64 - 1;
    let rank = (p * sorted.len() as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, last) as usize;

    Some(sorted[idx])
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSample {
    pub value: f64,
    pub weight: f64,
    pub id: Option<String>,
}

impl WeightedSample {
    pub fn new(value: f64, weight: f64, id: impl Into<String>) -> Self {
        Self {
            value,
            weight,
            id: Some(id.into()),
        }
    }
}

/// Weighted median by cumulative-weight crossing of half the total.
///
/// Weights are floored at 1 (non-finite weights count as 1). Samples are
/// ordered by value, then id (missing ids become `idx-<position>`), then
/// input position, so equal values resolve the same way on every run.
pub fn weighted_median(samples: &[WeightedSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let mut normalized: Vec<(usize, f64, f64, String)> = samples
        .iter()
        .enumerate()
        .map(|(order, s)| {
            let weight = if s.weight.is_finite() { s.weight.max(1.0) } else { 1.0 };
            let id = s.id.clone().unwrap_or_else(|| format!("idx-{order}"));
            (order, s.value, weight, id)
        })
        .collect();

    normalized.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| a.3.cmp(&b.3))
            .then_with(|| a.0.cmp(&b.0))
    });

    let total: f64 = normalized.iter().map(|s| s.2).sum();
    let half = total / 2.0;

    let mut cumulative = 0.0;
    for (_, value, weight, _) in &normalized {
        cumulative += weight;
        if cumulative >= half {
            return Some(*value);
        }
    }

    normalized.last().map(|s| s.1)
}

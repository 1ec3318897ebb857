use serde::{Deserialize, Serialize};

use crate::numeric::{clamp01, nonzero_number, safe_number};
use crate::types::{Comp, FactorWeights, SimilarityFilters, Subject};

/// Sub-score used when either side of a comparison is unknown. Missing data
/// is neither penalized nor rewarded.
pub const NEUTRAL: f64 = 0.5;

/// Per-factor similarity, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub distance: f64,
    pub recency: f64,
    pub sqft: f64,
    pub bed_bath: f64,
    pub year_built: f64,
}

/// Widest recency and distance windows across the policy ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWindows {
    pub recency_days: f64,
    pub distance_miles: f64,
}

pub trait SimilarityScorer {
    fn components(&self, comp: &Comp, subject: &Subject, days_old: Option<f64>) -> ScoreComponents;

    /// Weighted average of the components, scaled to `[0, 100]`.
    /// Negative or non-finite weights count as 0; all-zero weights score 0.
    /// Weights are scaled by the largest one before summing.
    fn score_value(&self, components: &ScoreComponents, weights: &FactorWeights) -> f64 {
        let weighted = [
            (components.distance, usable_weight(weights.distance)),
            (components.recency, usable_weight(weights.recency)),
            (components.sqft, usable_weight(weights.sqft)),
            (components.bed_bath, usable_weight(weights.bed_bath)),
            (components.year_built, usable_weight(weights.year_built)),
        ];

        let largest = weighted.iter().fold(0.0_f64, |acc, (_, w)| acc.max(*w));
        if largest == 0.0 {
            return 0.0;
        }

        let mut weight_sum = 0.0;
        let mut total = 0.0;
        for (sub_score, weight) in weighted {
            let w = weight / largest;
            weight_sum += w;
            total += sub_score * w;
        }

        let score = 100.0 * (total / weight_sum);
        debug_assert!((0.0..=100.0).contains(&score), "score {score} out of range [0, 100]");
        score
    }
}

fn usable_weight(weight: Option<f64>) -> f64 {
    safe_number(weight).map(|w| w.max(0.0)).unwrap_or(0.0)
}

/// `|comp_sqft - subject_sqft| / subject_sqft`, when both are known and the
/// subject size is positive.
pub fn sqft_delta_pct(subject: &Subject, comp: &Comp) -> Option<f64> {
    let subject_sqft = nonzero_number(subject.sqft).filter(|s| *s > 0.0)?;
    let comp_sqft = nonzero_number(comp.sqft)?;
    Some((comp_sqft - subject_sqft).abs() / subject_sqft)
}

/// Absolute difference of two optional attributes.
pub fn attribute_delta(subject: Option<f64>, comp: Option<f64>) -> Option<f64> {
    Some((safe_number(comp)? - safe_number(subject)?).abs())
}

/// `1 - delta / max_allowed`, clamped. Neutral when the delta is unknown or
/// no (non-zero) limit is configured.
fn ratio_score(delta: Option<f64>, max_allowed: Option<f64>) -> f64 {
    match (delta, safe_number(max_allowed).filter(|m| *m != 0.0)) {
        (Some(delta), Some(max)) => clamp01(1.0 - delta / max),
        _ => NEUTRAL,
    }
}

/// Multi-factor scorer driven by the policy's similarity limits and ladder
/// windows.
#[derive(Debug, Clone, Copy)]
pub struct WeightedFactorScorer<'a> {
    filters: &'a SimilarityFilters,
    windows: ScoringWindows,
}

impl<'a> WeightedFactorScorer<'a> {
    pub fn new(filters: &'a SimilarityFilters, windows: ScoringWindows) -> Self {
        Self { filters, windows }
    }
}

impl SimilarityScorer for WeightedFactorScorer<'_> {
    fn components(&self, comp: &Comp, subject: &Subject, days_old: Option<f64>) -> ScoreComponents {
        let sqft = ratio_score(sqft_delta_pct(subject, comp), self.filters.max_sqft_pct_delta);

        let beds = ratio_score(
            attribute_delta(subject.beds, comp.beds),
            self.filters.max_beds_delta,
        );
        let baths = ratio_score(
            attribute_delta(subject.baths, comp.baths),
            self.filters.max_baths_delta,
        );

        let year_built = ratio_score(
            attribute_delta(subject.year_built, comp.year_built),
            self.filters.max_year_built_delta,
        );

        let distance = match safe_number(comp.distance_miles) {
            Some(miles) if self.windows.distance_miles > 0.0 => {
                clamp01(1.0 - miles / self.windows.distance_miles)
            }
            _ => NEUTRAL,
        };

        let recency = match safe_number(days_old) {
            Some(days) if self.windows.recency_days > 0.0 => {
                clamp01(1.0 - days / self.windows.recency_days)
            }
            _ => NEUTRAL,
        };

        ScoreComponents {
            distance,
            recency,
            sqft,
            bed_bath: (beds + baths) / 2.0,
            year_built,
        }
    }
}

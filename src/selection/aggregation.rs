use crate::numeric::{nearest_rank_quantile, nonzero_number, weighted_median, WeightedSample};
use crate::selection::candidate::ScoredComp;
use crate::types::{RangeMethod, SelectionMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub suggested_arv: Option<f64>,
    pub range_low: Option<f64>,
    pub range_high: Option<f64>,
    pub basis: Vec<WeightedSample>,
}

/// Value each selected comp, weighted by its score.
///
/// With `weighted_median_ppsf`, a known subject size, and at least one
/// selected PPSF, comps are valued at `ppsf * subject_sqft`. Otherwise (and
/// for comps without a PPSF) the resolved price is used. Comps with neither
/// contribute nothing.
pub fn value_basis(
    selected: &[ScoredComp<'_>],
    subject_sqft: Option<f64>,
    method: SelectionMethod,
) -> Vec<WeightedSample> {
    let subject_sqft = nonzero_number(subject_sqft);
    let using_ppsf = method == SelectionMethod::WeightedMedianPpsf
        && subject_sqft.is_some()
        && selected.iter().any(|c| c.ppsf.is_some());

    selected
        .iter()
        .filter_map(|c| {
            let value = match (using_ppsf, c.ppsf, subject_sqft) {
                (true, Some(ppsf), Some(sqft)) => Some(ppsf * sqft),
                _ => c.price.map(|p| p.value),
            }?;
            Some(WeightedSample::new(value, c.score, c.resolved_id.as_str()))
        })
        .collect()
}

pub fn aggregate(
    selected: &[ScoredComp<'_>],
    subject_sqft: Option<f64>,
    method: SelectionMethod,
    range_method: RangeMethod,
) -> Aggregate {
    let basis = value_basis(selected, subject_sqft, method);
    let values: Vec<f64> = basis.iter().map(|s| s.value).collect();

    let (range_low, range_high) = match range_method {
        RangeMethod::P25P75 => (
            nearest_rank_quantile(&values, 0.25),
            nearest_rank_quantile(&values, 0.75),
        ),
        RangeMethod::NoRange => (None, None),
    };

    Aggregate {
        suggested_arv: weighted_median(&basis),
        range_low,
        range_high,
        basis,
    }
}

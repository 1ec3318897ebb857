use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_RECENCY_WINDOW_DAYS: f64 = 365.0;
const DEFAULT_DISTANCE_WINDOW_MILES: f64 = 5.0;
const DEFAULT_IQR_K: f64 = 1.5;
const DEFAULT_OUTLIER_METHOD: &str = "iqr";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown selection version: {0}")]
pub struct UnknownSelectionVersion(pub String);

/// Frozen algorithm variants. Each one must stay reproducible on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SelectionVersion {
    /// Blunt IQR removal, exact property-type matching.
    #[default]
    #[serde(rename = "selection_v1_1")]
    V1_1,
    /// Guarded IQR removal, grouped property-type matching, diagnostics.
    #[serde(rename = "selection_v1_3")]
    V1_3,
}

impl SelectionVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionVersion::V1_1 => "selection_v1_1",
            SelectionVersion::V1_3 => "selection_v1_3",
        }
    }

    /// Explicit argument, then the policy tag, then `selection_v1_1`.
    pub fn resolve(explicit: Option<SelectionVersion>, policy: &SelectionPolicy) -> Self {
        explicit.or(policy.selection_version).unwrap_or_default()
    }
}

impl FromStr for SelectionVersion {
    type Err = UnknownSelectionVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "selection_v1_1" => Ok(SelectionVersion::V1_1),
            "selection_v1_3" => Ok(SelectionVersion::V1_3),
            other => Err(UnknownSelectionVersion(other.to_string())),
        }
    }
}

impl std::fmt::Display for SelectionVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Value each comp as `ppsf * subject_sqft` when possible.
    #[default]
    WeightedMedianPpsf,
    /// Anything else: value each comp by its (adjusted) price.
    #[serde(other)]
    Price,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeMethod {
    #[default]
    #[serde(rename = "p25_p75")]
    P25P75,
    /// Unrecognised range methods produce no range.
    #[serde(other)]
    #[serde(rename = "none")]
    NoRange,
}

/// One tier of the comp-search ladder. Only the widest radius and date
/// range matter to selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderTier {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub radius_miles: Option<f64>,
    #[serde(default)]
    pub sale_date_range_days: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityFilters {
    #[serde(default)]
    pub max_sqft_pct_delta: Option<f64>,
    #[serde(default)]
    pub max_beds_delta: Option<f64>,
    #[serde(default)]
    pub max_baths_delta: Option<f64>,
    #[serde(default)]
    pub max_year_built_delta: Option<f64>,
    #[serde(default)]
    pub require_property_type_match: Option<bool>,
}

impl SimilarityFilters {
    pub fn requires_type_match(&self) -> bool {
        self.require_property_type_match.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub iqr_k: Option<f64>,
    #[serde(default)]
    pub min_samples: Option<usize>,
}

impl OutlierConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_OUTLIER_METHOD)
    }

    pub fn k(&self) -> f64 {
        self.iqr_k.filter(|k| k.is_finite()).unwrap_or(DEFAULT_IQR_K)
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples.unwrap_or(0)
    }
}

/// Relative weight of each similarity factor. Missing factors weigh 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub recency: Option<f64>,
    #[serde(default)]
    pub sqft: Option<f64>,
    #[serde(default)]
    pub bed_bath: Option<f64>,
    #[serde(default)]
    pub year_built: Option<f64>,
}

impl FactorWeights {
    /// Weights used when a policy carries none.
    pub fn standard() -> Self {
        Self {
            distance: Some(0.35),
            recency: Some(0.25),
            sqft: Some(0.25),
            bed_bath: Some(0.1),
            year_built: Some(0.05),
        }
    }
}

/// Versioned valuation policy. Immutable input to selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    #[serde(default)]
    pub closed_sales_ladder: Vec<LadderTier>,
    #[serde(default)]
    pub closed_sales_target_priced: Option<f64>,
    #[serde(default)]
    pub arv_comp_use_count: Option<usize>,
    #[serde(default, alias = "selectionVersion")]
    pub selection_version: Option<SelectionVersion>,
    #[serde(default)]
    pub selection_method: Option<SelectionMethod>,
    #[serde(default)]
    pub range_method: Option<RangeMethod>,
    #[serde(default)]
    pub similarity_filters: SimilarityFilters,
    #[serde(default)]
    pub outlier_ppsf: OutlierConfig,
    #[serde(default)]
    pub weights: Option<FactorWeights>,
}

impl SelectionPolicy {
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Widest `sale_date_range_days` across the ladder, or 365.
    pub fn recency_window_days(&self) -> f64 {
        widest(self.closed_sales_ladder.iter().map(|t| t.sale_date_range_days))
            .unwrap_or(DEFAULT_RECENCY_WINDOW_DAYS)
    }

    /// Widest `radius_miles` across the ladder, or 5.
    pub fn distance_window_miles(&self) -> f64 {
        widest(self.closed_sales_ladder.iter().map(|t| t.radius_miles))
            .unwrap_or(DEFAULT_DISTANCE_WINDOW_MILES)
    }

    pub fn effective_weights(&self) -> FactorWeights {
        self.weights.clone().unwrap_or_else(FactorWeights::standard)
    }

    pub fn effective_selection_method(&self) -> SelectionMethod {
        self.selection_method.unwrap_or_default()
    }

    pub fn effective_range_method(&self) -> RangeMethod {
        self.range_method.unwrap_or_default()
    }

    /// Target number of comps to aggregate: policy value, else the caller's
    /// minimum closed-comp requirement.
    pub fn use_count(&self, min_closed_comps_required: usize) -> usize {
        self.arv_comp_use_count.unwrap_or(min_closed_comps_required)
    }
}

/// Max of the present, finite values starting from zero. A zero maximum
/// means "no window configured".
fn widest(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let max = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        Some(max)
    } else {
        None
    }
}

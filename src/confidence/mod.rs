//! Contract with the downstream confidence grader.
//!
//! Grading itself lives outside this crate. This module only defines what
//! the grader consumes and returns, and how a [`SelectionResult`] feeds it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CompKind, SelectionResult, SelectionSummary, WarningCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceGrade {
    A,
    B,
    C,
}

/// Requirements for one grade tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricBand {
    /// Multiplied by `min_closed_comps_required`.
    #[serde(default)]
    pub min_comps_multiplier: Option<f64>,
    #[serde(default)]
    pub min_median_correlation: Option<f64>,
    #[serde(default)]
    pub max_range_pct: Option<f64>,
}

/// Grade tiers, as configured in policy.
pub type ConfidenceRubric = BTreeMap<ConfidenceGrade, RubricBand>;

/// Everything the grader reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInput {
    pub suggested_arv: Option<f64>,
    pub suggested_arv_range_low: Option<f64>,
    pub suggested_arv_range_high: Option<f64>,
    pub comp_kind_used: CompKind,
    pub comp_count_used: usize,
    pub min_closed_comps_required: usize,
    pub median_correlation: Option<f64>,
    pub selection_summary: SelectionSummary,
    pub warning_codes: Vec<WarningCode>,
    pub confidence_rubric: Option<ConfidenceRubric>,
}

impl ConfidenceInput {
    /// Everything except the correlation and rubric comes from the result.
    pub fn from_selection(
        result: &SelectionResult,
        median_correlation: Option<f64>,
        confidence_rubric: Option<ConfidenceRubric>,
    ) -> Self {
        Self {
            suggested_arv: result.suggested_arv,
            suggested_arv_range_low: result.suggested_arv_range_low,
            suggested_arv_range_high: result.suggested_arv_range_high,
            comp_kind_used: result.comp_kind_used,
            comp_count_used: result.selected_comp_ids.len(),
            min_closed_comps_required: result.selection_summary.min_closed_comps_required,
            median_correlation,
            selection_summary: result.selection_summary.clone(),
            warning_codes: result.warning_codes.clone(),
            confidence_rubric,
        }
    }

    /// `(high - low) / arv`, when all three are known and the ARV is non-zero.
    pub fn range_pct(&self) -> Option<f64> {
        let arv = self.suggested_arv.filter(|a| *a != 0.0)?;
        Some((self.suggested_arv_range_high? - self.suggested_arv_range_low?) / arv)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceOutcome {
    pub grade: ConfidenceGrade,
    /// Sorted, deduplicated reason codes.
    pub reasons: Vec<String>,
}

/// Implemented by the external grading module.
pub trait ConfidenceGrader {
    fn grade(&self, input: &ConfidenceInput) -> ConfidenceOutcome;
}

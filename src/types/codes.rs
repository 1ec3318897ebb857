//! Machine-readable codes carried in selection output.
//!
//! Variants are declared in lexical order of their wire names, so the
//! derived `Ord` sorts them exactly as their strings sort.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    FailsoftZeroAfterFilters,
    MissingSubjectBaths,
    MissingSubjectBeds,
    MissingSubjectPropertyType,
    MissingSubjectSqft,
    MissingSubjectYearBuilt,
    PropertyTypeGroupMatchSfrTownhome,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FailsoftZeroAfterFilters => "failsoft_zero_after_filters",
            WarningCode::MissingSubjectBaths => "missing_subject_baths",
            WarningCode::MissingSubjectBeds => "missing_subject_beds",
            WarningCode::MissingSubjectPropertyType => "missing_subject_property_type",
            WarningCode::MissingSubjectSqft => "missing_subject_sqft",
            WarningCode::MissingSubjectYearBuilt => "missing_subject_year_built",
            WarningCode::PropertyTypeGroupMatchSfrTownhome => {
                "property_type_group_match_sfr_townhome"
            }
        }
    }
}

/// Why a comp was hard-excluded before the outlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    PropertyTypeMismatch,
    SqftDeltaPctGtMax,
}

/// Soft evidence that a comp is a poor match. Never excludes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchSignal {
    BathsDeltaHigh,
    BedsDeltaHigh,
    DistanceOutsideWindow,
    PropertyTypeGroupMatchSfrTownhome,
    RecencyOutsideWindow,
    SqftDeltaHigh,
    TypeMismatch,
    YearBuiltDeltaHigh,
}

impl MismatchSignal {
    /// Whether the signal counts as secondary evidence for outlier removal.
    /// A single-family/townhome pairing inside one group is informational only.
    pub fn is_secondary(&self) -> bool {
        !matches!(self, MismatchSignal::PropertyTypeGroupMatchSfrTownhome)
    }
}

/// A rule the engine loosened to keep evidence available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relaxation {
    OutlierGuardMinRequired,
    OutlierSecondarySignalMissing,
    SqftFilterRelaxed,
}

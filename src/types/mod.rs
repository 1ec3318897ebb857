pub mod codes;
pub mod comp;
pub mod identifiers;
pub mod policy;
pub mod property_type;
pub mod selection_result;

pub use codes::{ExclusionReason, MismatchSignal, Relaxation, WarningCode};
pub use comp::{Comp, CompKind, Subject};
pub use identifiers::CompId;
pub use policy::{
    FactorWeights, LadderTier, OutlierConfig, PolicyError, RangeMethod, SelectionMethod,
    SelectionPolicy, SelectionVersion, SimilarityFilters, UnknownSelectionVersion,
};
pub use property_type::{canonicalize_property_type, PropertyTypeGroup};
pub use selection_result::{
    AppliedFilters, CandidateCounts, DiagnosticCounts, DiagnosticFilters, DiagnosticOutliers,
    EvidenceTrail, FailsoftReason, FailsoftSummary, FilterSummary, FlaggedOutlier, OutlierBounds,
    OutlierSummary, PolicyUsed, RankingEntry, SelectedComp, SelectionDiagnostics,
    SelectionResult, SelectionSummary, SoftPenalties,
};

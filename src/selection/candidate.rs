use crate::determinism::stable_stringify_of;
use crate::numeric::evidence::{resolve_days_old, resolve_price, resolve_sale_date};
use crate::numeric::{nonzero_number, parse_timestamp_millis, safe_number, Evidence};
use crate::selection::filters::FilterOutcome;
use crate::selection::scoring::{
    sqft_delta_pct, ScoreComponents, ScoringWindows, SimilarityScorer, WeightedFactorScorer,
};
use crate::selection::SelectionRequest;
use crate::types::{
    Comp, CompId, EvidenceTrail, ExclusionReason, FactorWeights, MismatchSignal, SelectionPolicy,
    SimilarityFilters, Subject, WarningCode,
};

/// Per-run knobs resolved once from the request and policy.
#[derive(Debug, Clone)]
pub struct SelectionContext<'a> {
    pub subject: &'a Subject,
    pub policy: &'a SelectionPolicy,
    pub weights: FactorWeights,
    pub windows: ScoringWindows,
    pub use_count: usize,
    pub min_closed_comps_required: usize,
    /// Sorted.
    pub missing_subject: Vec<WarningCode>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(request: &SelectionRequest<'a>) -> Self {
        let policy = request.policy;
        Self {
            subject: request.subject,
            policy,
            weights: policy.effective_weights(),
            windows: ScoringWindows {
                recency_days: policy.recency_window_days(),
                distance_miles: policy.distance_window_miles(),
            },
            use_count: policy.use_count(request.min_closed_comps_required),
            min_closed_comps_required: request.min_closed_comps_required,
            missing_subject: missing_subject_warnings(request.subject),
        }
    }

    pub fn filters(&self) -> &'a SimilarityFilters {
        &self.policy.similarity_filters
    }

    pub fn scorer(&self) -> WeightedFactorScorer<'a> {
        WeightedFactorScorer::new(&self.policy.similarity_filters, self.windows)
    }

    /// Smallest pool the guarded outlier pass may leave behind.
    pub fn min_required(&self) -> usize {
        1.max(self.min_closed_comps_required).max(self.use_count)
    }
}

/// Subject attributes that are absent (or zero), as sorted warning codes.
pub fn missing_subject_warnings(subject: &Subject) -> Vec<WarningCode> {
    let mut missing = Vec::new();
    if nonzero_number(subject.sqft).is_none() {
        missing.push(WarningCode::MissingSubjectSqft);
    }
    if nonzero_number(subject.beds).is_none() {
        missing.push(WarningCode::MissingSubjectBeds);
    }
    if nonzero_number(subject.baths).is_none() {
        missing.push(WarningCode::MissingSubjectBaths);
    }
    if nonzero_number(subject.year_built).is_none() {
        missing.push(WarningCode::MissingSubjectYearBuilt);
    }
    if subject.property_type.as_deref().map_or(true, str::is_empty) {
        missing.push(WarningCode::MissingSubjectPropertyType);
    }
    missing.sort();
    missing
}

/// A comp that has been scored and screened but not yet selected.
/// Borrows the caller's record; nothing is cloned until output.
#[derive(Debug, Clone)]
pub struct ScoredComp<'a> {
    pub comp: &'a Comp,
    pub resolved_id: CompId,
    /// Canonical JSON of the record. Last tie-break when ids collide.
    pub content_key: String,

    pub score: f64,
    pub components: ScoreComponents,

    pub price: Option<Evidence<f64>>,
    pub ppsf: Option<f64>,
    pub days_old: Option<Evidence<f64>>,
    pub sale_timestamp: Option<i64>,
    pub abs_sqft_delta_pct: Option<f64>,

    pub exclusion: Option<ExclusionReason>,
    pub signals: Vec<MismatchSignal>,
    pub evidence: EvidenceTrail,
}

impl<'a> ScoredComp<'a> {
    /// Derive everything selection needs from one comp. Screening results
    /// are attached afterwards with [`ScoredComp::apply`].
    pub fn assess(ctx: &SelectionContext<'_>, comp: &'a Comp) -> Self {
        let price = resolve_price(comp);
        let sale_date = resolve_sale_date(comp);
        let days_old = resolve_days_old(comp);

        let ppsf = match (price, safe_number(comp.sqft)) {
            (Some(price), Some(sqft)) if sqft > 0.0 => Some(price.value / sqft),
            _ => None,
        };

        let scorer = ctx.scorer();
        let components = scorer.components(comp, ctx.subject, days_old.map(|d| d.value));
        let score = scorer.score_value(&components, &ctx.weights);

        Self {
            comp,
            resolved_id: CompId::resolve(comp),
            content_key: stable_stringify_of(comp).unwrap_or_default(),
            score,
            components,
            price,
            ppsf,
            days_old,
            sale_timestamp: sale_date.and_then(|d| parse_timestamp_millis(d.value)),
            abs_sqft_delta_pct: sqft_delta_pct(ctx.subject, comp),
            exclusion: None,
            signals: Vec::new(),
            evidence: EvidenceTrail {
                price: price.map(|p| p.source),
                sale_date: sale_date.map(|d| d.source),
                days_old: days_old.map(|d| d.source),
                property_type: None,
            },
        }
    }

    pub fn apply(&mut self, outcome: FilterOutcome) {
        self.exclusion = outcome.exclusion;
        self.signals = outcome.signals;
        self.evidence.property_type = outcome.property_type_source;
    }

    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    pub fn distance_miles(&self) -> Option<f64> {
        safe_number(self.comp.distance_miles)
    }

    pub fn days_old_value(&self) -> Option<f64> {
        self.days_old.map(|d| d.value)
    }

    /// Mismatch signals that count as evidence for outlier removal, sorted.
    pub fn secondary_signals(&self) -> Vec<MismatchSignal> {
        let mut secondary: Vec<MismatchSignal> = self
            .signals
            .iter()
            .copied()
            .filter(MismatchSignal::is_secondary)
            .collect();
        secondary.sort();
        secondary.dedup();
        secondary
    }
}

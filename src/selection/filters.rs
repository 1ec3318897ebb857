use std::collections::BTreeMap;

use crate::numeric::evidence::resolve_property_type;
use crate::numeric::EvidenceSource;
use crate::selection::candidate::{ScoredComp, SelectionContext};
use crate::selection::scoring::attribute_delta;
use crate::types::property_type::{is_sfr_like, is_townhome_like};
use crate::types::{canonicalize_property_type, ExclusionReason, MismatchSignal, PropertyTypeGroup};

/// Soft sqft threshold used for the `sqft_delta_high` signal when the policy
/// sets no hard limit.
const SOFT_SQFT_PCT_DELTA: f64 = 0.35;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub exclusion: Option<ExclusionReason>,
    pub signals: Vec<MismatchSignal>,
    pub property_type_source: Option<EvidenceSource>,
}

impl FilterOutcome {
    pub fn has_signal(&self, signal: MismatchSignal) -> bool {
        self.signals.contains(&signal)
    }
}

fn exceeds_sqft_limit(ctx: &SelectionContext<'_>, candidate: &ScoredComp<'_>) -> bool {
    match (ctx.filters().max_sqft_pct_delta, candidate.abs_sqft_delta_pct) {
        (Some(max), Some(delta)) => delta > max,
        _ => false,
    }
}

/// Exact-type screening (`selection_v1_1`).
///
/// Hard excludes only: canonical property types must be equal when the
/// policy requires it and both sides are known, then the sqft limit.
pub fn screen_exact(ctx: &SelectionContext<'_>, candidate: &ScoredComp<'_>) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    let subject_type = canonicalize_property_type(ctx.subject.property_type.as_deref());
    let comp_type = canonicalize_property_type(candidate.comp.property_type.as_deref());
    if comp_type.is_some() {
        outcome.property_type_source = Some(EvidenceSource::PropertyType);
    }

    if ctx.filters().requires_type_match() {
        if let (Some(subject_type), Some(comp_type)) = (&subject_type, &comp_type) {
            if subject_type != comp_type {
                outcome.exclusion = Some(ExclusionReason::PropertyTypeMismatch);
            }
        }
    }

    if outcome.exclusion.is_none() && exceeds_sqft_limit(ctx, candidate) {
        outcome.exclusion = Some(ExclusionReason::SqftDeltaPctGtMax);
    }

    outcome
}

/// Grouped-type screening with soft mismatch signals (`selection_v1_3`).
pub fn screen_grouped(ctx: &SelectionContext<'_>, candidate: &ScoredComp<'_>) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let filters = ctx.filters();

    let subject_type = canonicalize_property_type(ctx.subject.property_type.as_deref());
    let comp_evidence = resolve_property_type(candidate.comp);
    let comp_type = comp_evidence.and_then(|e| canonicalize_property_type(Some(e.value)));
    if comp_type.is_some() {
        outcome.property_type_source = comp_evidence.map(|e| e.source);
    }

    if let (Some(subject_type), Some(comp_type)) = (&subject_type, &comp_type) {
        let subject_group = PropertyTypeGroup::of(subject_type);
        let comp_group = PropertyTypeGroup::of(comp_type);

        if subject_group != comp_group {
            outcome.signals.push(MismatchSignal::TypeMismatch);
            if filters.requires_type_match() {
                outcome.exclusion = Some(ExclusionReason::PropertyTypeMismatch);
            }
        } else if is_sfr_townhome_pairing(subject_group, subject_type, comp_type) {
            outcome
                .signals
                .push(MismatchSignal::PropertyTypeGroupMatchSfrTownhome);
        }
    }

    if outcome.exclusion.is_none() && exceeds_sqft_limit(ctx, candidate) {
        outcome.exclusion = Some(ExclusionReason::SqftDeltaPctGtMax);
    } else if let Some(delta) = candidate.abs_sqft_delta_pct {
        let soft_limit = filters.max_sqft_pct_delta.unwrap_or(SOFT_SQFT_PCT_DELTA);
        if delta > soft_limit {
            outcome.signals.push(MismatchSignal::SqftDeltaHigh);
        }
    }

    let comp = candidate.comp;
    let subject = ctx.subject;
    let attribute_checks = [
        (subject.beds, comp.beds, filters.max_beds_delta, MismatchSignal::BedsDeltaHigh),
        (subject.baths, comp.baths, filters.max_baths_delta, MismatchSignal::BathsDeltaHigh),
        (
            subject.year_built,
            comp.year_built,
            filters.max_year_built_delta,
            MismatchSignal::YearBuiltDeltaHigh,
        ),
    ];
    for (subject_value, comp_value, max_delta, signal) in attribute_checks {
        if let (Some(delta), Some(max)) = (attribute_delta(subject_value, comp_value), max_delta) {
            if delta > max {
                outcome.signals.push(signal);
            }
        }
    }

    if let Some(days) = candidate.days_old_value() {
        if ctx.windows.recency_days > 0.0 && days > ctx.windows.recency_days {
            outcome.signals.push(MismatchSignal::RecencyOutsideWindow);
        }
    }

    if let Some(miles) = candidate.distance_miles() {
        if miles > ctx.windows.distance_miles {
            outcome.signals.push(MismatchSignal::DistanceOutsideWindow);
        }
    }

    outcome.signals.sort();
    outcome
}

/// A single-family subject matched with a townhome comp (or the reverse)
/// inside the shared `sfr_townhome` group.
fn is_sfr_townhome_pairing(group: PropertyTypeGroup, subject_type: &str, comp_type: &str) -> bool {
    group == PropertyTypeGroup::SfrTownhome
        && is_townhome_like(subject_type) != is_townhome_like(comp_type)
        && is_sfr_like(subject_type) != is_sfr_like(comp_type)
}

/// Candidates without a hard exclusion, in input order.
pub fn passed<'a>(candidates: &[ScoredComp<'a>]) -> Vec<ScoredComp<'a>> {
    candidates.iter().filter(|c| !c.is_excluded()).cloned().collect()
}

pub fn exclusion_counts(candidates: &[ScoredComp<'_>]) -> BTreeMap<ExclusionReason, usize> {
    let mut counts = BTreeMap::new();
    for reason in candidates.iter().filter_map(|c| c.exclusion) {
        *counts.entry(reason).or_insert(0) += 1;
    }
    counts
}

/// Fail-soft retry: lift the sqft exclusion and nothing else. Property-type
/// exclusions stay in force.
pub fn relax_sqft<'a>(candidates: &[ScoredComp<'a>]) -> Vec<ScoredComp<'a>> {
    candidates
        .iter()
        .filter(|c| matches!(c.exclusion, None | Some(ExclusionReason::SqftDeltaPctGtMax)))
        .cloned()
        .map(|mut c| {
            c.exclusion = None;
            c
        })
        .collect()
}

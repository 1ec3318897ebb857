//! Evidence resolution for fields that have fallbacks.
//!
//! Every resolver returns the value together with the field it came from so
//! callers (and the audit trail) can tell which path fired.

use serde::{Deserialize, Serialize};

use super::coerce::safe_number;
use super::dates::days_between;
use crate::types::comp::Comp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    PriceAdjusted,
    Price,
    CloseDate,
    ListDate,
    DaysOld,
    SaleDateToAsOf,
    PropertyType,
    PropertyTypeDisplay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence<T> {
    pub value: T,
    pub source: EvidenceSource,
}

impl<T> Evidence<T> {
    pub fn new(value: T, source: EvidenceSource) -> Self {
        Self { value, source }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// `price_adjusted`, else `price`.
pub fn resolve_price(comp: &Comp) -> Option<Evidence<f64>> {
    if let Some(adjusted) = safe_number(comp.price_adjusted) {
        return Some(Evidence::new(adjusted, EvidenceSource::PriceAdjusted));
    }
    safe_number(comp.price).map(|price| Evidence::new(price, EvidenceSource::Price))
}

/// `close_date`, else `list_date`.
pub fn resolve_sale_date(comp: &Comp) -> Option<Evidence<&str>> {
    if let Some(close) = non_empty(comp.close_date.as_deref()) {
        return Some(Evidence::new(close, EvidenceSource::CloseDate));
    }
    non_empty(comp.list_date.as_deref()).map(|list| Evidence::new(list, EvidenceSource::ListDate))
}

/// Explicit `days_old`, else the day delta from the sale date to `as_of`.
pub fn resolve_days_old(comp: &Comp) -> Option<Evidence<f64>> {
    if let Some(explicit) = safe_number(comp.days_old) {
        return Some(Evidence::new(explicit, EvidenceSource::DaysOld));
    }
    let sale_date = resolve_sale_date(comp)?;
    days_between(Some(sale_date.value), comp.as_of.as_deref())
        .map(|days| Evidence::new(days as f64, EvidenceSource::SaleDateToAsOf))
}

/// `property_type`, else `property_type_display`.
pub fn resolve_property_type(comp: &Comp) -> Option<Evidence<&str>> {
    if let Some(raw) = comp.property_type.as_deref() {
        return Some(Evidence::new(raw, EvidenceSource::PropertyType));
    }
    comp.property_type_display
        .as_deref()
        .map(|raw| Evidence::new(raw, EvidenceSource::PropertyTypeDisplay))
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::numeric::coerce::{lenient_number, lenient_string};

/// The property being valued. Every field is optional; missing fields
/// lower matching confidence but never abort selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, deserialize_with = "lenient_number")]
    pub sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub beds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub baths: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_built: Option<f64>,
    #[serde(default, alias = "propertyType")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompKind {
    ClosedSale,
    SaleListing,
    #[serde(other)]
    Other,
}

/// A candidate comparable sale or listing, as supplied by the caller.
///
/// Fields the engine does not read are kept in `extra` and carried through
/// to the selected output untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comp {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub comp_kind: Option<CompKind>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price_adjusted: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub distance_miles: Option<f64>,

    #[serde(default)]
    pub close_date: Option<String>,
    #[serde(default)]
    pub list_date: Option<String>,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub days_old: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub beds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub baths: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_built: Option<f64>,
    #[serde(default, alias = "propertyType")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub property_type_display: Option<String>,

    #[serde(default)]
    pub source_stage_name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

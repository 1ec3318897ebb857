use serde::{Deserialize, Serialize};

/// Lower-case and strip everything that is not `[a-z0-9]`.
/// `"Single Family"`, `"single_family"` and `"SINGLE-FAMILY"` all become
/// `"singlefamily"`. Empty results are `None`.
pub fn canonicalize_property_type(raw: Option<&str>) -> Option<String> {
    let normalized: String = raw?
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Compatibility groups used by the grouped (v1_3) type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTypeGroup {
    SfrTownhome,
    Condo,
    SmallMultifamily,
    Manufactured,
    Land,
    SingleFamily,
}

impl PropertyTypeGroup {
    /// Group a canonical type. Unrecognised residential labels fall into
    /// `SingleFamily`.
    pub fn of(canonical: &str) -> Self {
        if is_townhome_like(canonical) || is_sfr_like(canonical) {
            PropertyTypeGroup::SfrTownhome
        } else if canonical.contains("condo") {
            PropertyTypeGroup::Condo
        } else if ["duplex", "triplex", "quad"].iter().any(|k| canonical.contains(k)) {
            PropertyTypeGroup::SmallMultifamily
        } else if canonical.contains("manufactured") || canonical.contains("mobile") {
            PropertyTypeGroup::Manufactured
        } else if canonical.contains("land") {
            PropertyTypeGroup::Land
        } else {
            PropertyTypeGroup::SingleFamily
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyTypeGroup::SfrTownhome => "sfr_townhome",
            PropertyTypeGroup::Condo => "condo",
            PropertyTypeGroup::SmallMultifamily => "small_multifamily",
            PropertyTypeGroup::Manufactured => "manufactured",
            PropertyTypeGroup::Land => "land",
            PropertyTypeGroup::SingleFamily => "single_family",
        }
    }
}

pub fn is_townhome_like(canonical: &str) -> bool {
    matches!(canonical, "townhome" | "townhouse" | "th")
}

pub fn is_sfr_like(canonical: &str) -> bool {
    matches!(canonical, "singlefamily" | "sfr")
}

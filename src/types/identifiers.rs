use serde::{Deserialize, Serialize};

use crate::numeric::safe_number;
use crate::types::comp::Comp;

const UNKNOWN_COMP: &str = "unknown-comp";

/// Deterministic, never-empty identity of a comp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompId(String);

impl CompId {
    pub fn new(id: impl Into<String>) -> Self {
        CompId(id.into())
    }

    /// Resolve the identity of a comp.
    ///
    /// Order:
    /// 1. explicit `id`, trimmed, when non-empty
    /// 2. `address|close_date-or-list_date|price` composite
    /// 3. `unknown-comp`, when address, date and price are all missing
    ///
    /// The composite keeps empty segments (`|2024-12-01|400000`).
    pub fn resolve(comp: &Comp) -> Self {
        if let Some(explicit) = comp.id.as_deref().map(str::trim) {
            if !explicit.is_empty() {
                return CompId(explicit.to_string());
            }
        }

        let date = comp
            .close_date
            .as_deref()
            .or(comp.list_date.as_deref())
            .unwrap_or("");
        let price = safe_number(comp.price)
            .map(|p| p.to_string())
            .unwrap_or_default();
        let address = comp.address.as_deref().unwrap_or("");

        if address.is_empty() && date.is_empty() && price.is_empty() {
            return CompId(UNKNOWN_COMP.to_string());
        }
        CompId([address, date, price.as_str()].join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub mod coerce;
pub mod dates;
pub mod evidence;
pub mod stats;

pub use coerce::{clamp01, coerce_number, nonzero_number, safe_number};
pub use dates::{days_between, parse_timestamp_millis};
pub use evidence::{Evidence, EvidenceSource};
pub use stats::{nearest_rank_quantile, weighted_median, WeightedSample};

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use valuation_core::run_valuation_selection;
use valuation_core::selection::algorithm_for;
use valuation_core::types::{
    CompKind, FactorWeights, PolicyError, RangeMethod, SelectionMethod, SelectionPolicy,
    SelectionVersion, Subject, UnknownSelectionVersion,
};

const BASE_POLICY: &str = r#"{
    "closed_sales_ladder": [
        { "name": "tier_1", "radius_miles": 0.5, "sale_date_range_days": 90 },
        { "name": "tier_2", "radius_miles": 1.0, "sale_date_range_days": 180 },
        { "name": "tier_3", "radius_miles": 2.0, "sale_date_range_days": 365 }
    ],
    "closed_sales_target_priced": 6,
    "arv_comp_use_count": 5,
    "selection_version": "selection_v1_3",
    "selection_method": "weighted_median_ppsf",
    "range_method": "p25_p75",
    "similarity_filters": {
        "max_sqft_pct_delta": 0.25,
        "max_beds_delta": 1,
        "max_baths_delta": 1,
        "max_year_built_delta": 20,
        "require_property_type_match": true
    },
    "outlier_ppsf": { "enabled": true, "method": "iqr", "iqr_k": 1.5, "min_samples": 6 },
    "weights": { "distance": 0.4, "recency": 0.2, "sqft": 0.2, "bed_bath": 0.1, "year_built": 0.1 },
    "confidence_rubric": { "A": { "min_comps_multiplier": 1.5 } }
}"#;

#[test]
fn parses_a_full_policy_document() {
    let policy = SelectionPolicy::from_json_str(BASE_POLICY).unwrap();

    assert_eq!(policy.closed_sales_ladder.len(), 3);
    assert_eq!(policy.closed_sales_ladder[0].name.as_deref(), Some("tier_1"));
    assert_eq!(policy.closed_sales_target_priced, Some(6.0));
    assert_eq!(policy.arv_comp_use_count, Some(5));
    assert_eq!(policy.selection_version, Some(SelectionVersion::V1_3));
    assert_eq!(policy.effective_selection_method(), SelectionMethod::WeightedMedianPpsf);
    assert_eq!(policy.effective_range_method(), RangeMethod::P25P75);

    assert_eq!(policy.similarity_filters.max_sqft_pct_delta, Some(0.25));
    assert!(policy.similarity_filters.requires_type_match());

    assert!(policy.outlier_ppsf.is_enabled());
    assert_eq!(policy.outlier_ppsf.method_name(), "iqr");
    assert_eq!(policy.outlier_ppsf.k(), 1.5);
    assert_eq!(policy.outlier_ppsf.min_samples(), 6);

    assert_eq!(policy.effective_weights().distance, Some(0.4));

    // Widest ladder tier
    assert_eq!(policy.recency_window_days(), 365.0);
    assert_eq!(policy.distance_window_miles(), 2.0);
    assert_eq!(policy.use_count(3), 5);
}

#[test]
fn empty_policy_falls_back_to_defaults() {
    let policy = SelectionPolicy::from_json_str("{}").unwrap();

    assert_eq!(policy, SelectionPolicy::default());
    assert_eq!(policy.recency_window_days(), 365.0);
    assert_eq!(policy.distance_window_miles(), 5.0);
    assert_eq!(policy.effective_weights(), FactorWeights::standard());
    assert_eq!(policy.effective_selection_method(), SelectionMethod::WeightedMedianPpsf);
    assert_eq!(policy.effective_range_method(), RangeMethod::P25P75);
    assert!(!policy.outlier_ppsf.is_enabled());
    assert_eq!(policy.outlier_ppsf.method_name(), "iqr");
    assert_eq!(policy.outlier_ppsf.k(), 1.5);
    assert!(!policy.similarity_filters.requires_type_match());
    assert_eq!(policy.use_count(3), 3);
}

#[test]
fn camel_case_version_tag_is_accepted() {
    let policy = SelectionPolicy::from_json_str(r#"{"selectionVersion": "selection_v1_3"}"#).unwrap();
    assert_eq!(policy.selection_version, Some(SelectionVersion::V1_3));
}

#[test]
fn unknown_version_tag_is_rejected() {
    let err = SelectionPolicy::from_json_str(r#"{"selection_version": "selection_v2_0"}"#).unwrap_err();
    assert!(matches!(err, PolicyError::Parse(_)));

    assert_eq!(
        "selection_v2_0".parse::<SelectionVersion>(),
        Err(UnknownSelectionVersion("selection_v2_0".to_string()))
    );
    assert_eq!("selection_v1_1".parse::<SelectionVersion>(), Ok(SelectionVersion::V1_1));
    assert_eq!(" selection_v1_3 ".parse::<SelectionVersion>(), Ok(SelectionVersion::V1_3));
}

#[test]
fn version_resolution_order() {
    let tagged = SelectionPolicy {
        selection_version: Some(SelectionVersion::V1_3),
        ..SelectionPolicy::default()
    };
    let untagged = SelectionPolicy::default();

    assert_eq!(
        SelectionVersion::resolve(Some(SelectionVersion::V1_1), &tagged),
        SelectionVersion::V1_1
    );
    assert_eq!(SelectionVersion::resolve(None, &tagged), SelectionVersion::V1_3);
    assert_eq!(SelectionVersion::resolve(None, &untagged), SelectionVersion::V1_1);
    assert_eq!(SelectionVersion::V1_3.to_string(), "selection_v1_3");
}

#[test]
fn version_tag_dispatches_to_matching_algorithm() {
    let tagged = SelectionPolicy {
        selection_version: Some(SelectionVersion::V1_3),
        ..SelectionPolicy::default()
    };

    for version in [SelectionVersion::V1_1, SelectionVersion::V1_3] {
        assert_eq!(algorithm_for(version).version(), version);

        let result = run_valuation_selection(
            &Subject::default(),
            &[],
            &tagged,
            3,
            CompKind::ClosedSale,
            Some(version),
        );
        assert_eq!(result.selection_version, version);
        assert_eq!(result.selection_summary.algorithm_version, version);
        assert_eq!(result.diagnostics.is_some(), version == SelectionVersion::V1_3);
    }
}

#[test]
fn unrecognised_methods_fall_back() {
    let policy = SelectionPolicy::from_json_str(
        r#"{"selection_method": "comps_median", "range_method": "iqr", "outlier_ppsf": {"iqr_k": null}}"#,
    )
    .unwrap();

    assert_eq!(policy.effective_selection_method(), SelectionMethod::Price);
    assert_eq!(policy.effective_range_method(), RangeMethod::NoRange);
    assert_eq!(policy.outlier_ppsf.k(), 1.5);
}

#[test]
fn malformed_document_is_a_parse_error() {
    let err = SelectionPolicy::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, PolicyError::Parse(_)));
    assert!(err.to_string().starts_with("Invalid policy document"));
}

#[test]
fn loads_policy_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("policy.json");
    fs::write(&path, BASE_POLICY).unwrap();

    let from_disk = SelectionPolicy::from_path(&path).unwrap();
    let from_str = SelectionPolicy::from_json_str(BASE_POLICY).unwrap();
    assert_eq!(from_disk, from_str);
}

#[test]
fn missing_policy_file_is_an_io_error() {
    let err = SelectionPolicy::from_path(Path::new("/nonexistent/valuation/policy.json")).unwrap_err();
    assert!(matches!(err, PolicyError::Io(_)));
}

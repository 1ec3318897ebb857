use serde_json::{json, Value};
use valuation_core::numeric::EvidenceSource;
use valuation_core::run_valuation_selection;
use valuation_core::selection::selection_count;
use valuation_core::types::{Comp, CompKind, SelectionPolicy, SelectionResult, SelectionVersion, Subject};

const BOTH_VERSIONS: [SelectionVersion; 2] = [SelectionVersion::V1_1, SelectionVersion::V1_3];

fn make_comp(value: Value) -> Comp {
    serde_json::from_value(value).unwrap()
}

fn make_policy(value: Value) -> SelectionPolicy {
    serde_json::from_value(value).unwrap()
}

fn ids(result: &SelectionResult) -> Vec<&str> {
    result.selected_comp_ids.iter().map(|id| id.as_str()).collect()
}

fn run(subject: &Subject, comps: &[Comp], policy: &SelectionPolicy, version: SelectionVersion) -> SelectionResult {
    run_valuation_selection(subject, comps, policy, 3, CompKind::ClosedSale, Some(version))
}

#[test]
fn weighted_median_follows_similarity_weights() {
    // ------------------------------------------------------------
    // 1. Subject of 1320 sqft; comps at 185.6, 190.3 and 192.2 per sqft
    // ------------------------------------------------------------
    let subject = Subject {
        sqft: Some(1320.0),
        ..Subject::default()
    };
    let comps = vec![
        make_comp(json!({"id": "low", "price": 244992, "sqft": 1320, "distance_miles": 4.5})),
        make_comp(json!({"id": "mid", "price": 251196, "sqft": 1320, "distance_miles": 2.5})),
        make_comp(json!({"id": "high", "price": 253704, "sqft": 1320, "distance_miles": 0})),
    ];

    // Distance is the only weighted factor: scores are ~10, 50 and 100
    let policy = make_policy(json!({
        "arv_comp_use_count": 3,
        "selection_method": "weighted_median_ppsf",
        "range_method": "p25_p75",
        "similarity_filters": { "max_sqft_pct_delta": 0.25 },
        "weights": { "distance": 1 }
    }));

    let low = (244992.0 / 1320.0) * 1320.0;
    let mid = (251196.0 / 1320.0) * 1320.0;
    let high = (253704.0 / 1320.0) * 1320.0;

    for version in BOTH_VERSIONS {
        let result = run(&subject, &comps, &policy, version);

        // ------------------------------------------------------------
        // 2. Ranking is by score
        // ------------------------------------------------------------
        assert_eq!(ids(&result), vec!["high", "mid", "low"]);
        let scores: Vec<f64> = result.selected_comps.iter().map(|c| c.score).collect();
        assert!((scores[0] - 100.0).abs() < 1e-9);
        assert!((scores[1] - 50.0).abs() < 1e-9);
        assert!((scores[2] - 10.0).abs() < 1e-9);

        // ------------------------------------------------------------
        // 3. The top comp holds more than half the weight (100 of 160)
        // ------------------------------------------------------------
        assert_eq!(result.suggested_arv, Some(high));
        assert_ne!(result.suggested_arv, Some(mid), "an unweighted median would pick the middle comp");
        assert_eq!(result.suggested_arv_range_low, Some(low));
        assert_eq!(result.suggested_arv_range_high, Some(high));

        assert_eq!(result.selected_comps[0].ppsf, Some(253704.0 / 1320.0));
        assert_eq!(result.selected_comps[0].evidence.price, Some(EvidenceSource::Price));
    }
}

#[test]
fn equal_candidates_rank_by_id() {
    let subject = Subject::default();
    let policy = SelectionPolicy::default();
    let comps: Vec<Comp> = ["b", "c", "a"]
        .iter()
        .map(|id| make_comp(json!({"id": id, "price": 300000, "sqft": 1500, "distance_miles": 1})))
        .collect();

    for version in BOTH_VERSIONS {
        assert_eq!(ids(&run(&subject, &comps, &policy, version)), vec!["a", "b", "c"]);
    }
}

#[test]
fn equal_scores_rank_by_distance_with_missing_last() {
    // Only sqft is weighted and the subject has no size: every comp scores 50
    let subject = Subject::default();
    let policy = make_policy(json!({"weights": {"sqft": 1}}));
    let comps = vec![
        make_comp(json!({"id": "a", "price": 300000, "distance_miles": 3})),
        make_comp(json!({"id": "b", "price": 300000})),
        make_comp(json!({"id": "c", "price": 300000, "distance_miles": 1})),
    ];

    for version in BOTH_VERSIONS {
        let result = run(&subject, &comps, &policy, version);
        assert!(result.selected_comps.iter().all(|c| (c.score - 50.0).abs() < 1e-9));
        assert_eq!(ids(&result), vec!["c", "a", "b"]);
    }
}

#[test]
fn versions_break_remaining_ties_differently() {
    let subject = Subject::default();
    let policy = make_policy(json!({"weights": {"sqft": 1}}));
    let comps = vec![
        make_comp(json!({"id": "recent_sale", "price": 300000, "close_date": "2024-12-01", "days_old": 30})),
        make_comp(json!({"id": "fresh_record", "price": 310000, "close_date": "2024-11-01", "days_old": 10})),
    ];

    let v1_1 = run(&subject, &comps, &policy, SelectionVersion::V1_1);
    assert_eq!(ids(&v1_1), vec!["recent_sale", "fresh_record"], "later sale date first");

    let v1_3 = run(&subject, &comps, &policy, SelectionVersion::V1_3);
    assert_eq!(ids(&v1_3), vec!["fresh_record", "recent_sale"], "fewer days old first");
}

#[test]
fn selection_count_is_bounded_by_pool() {
    assert_eq!(selection_count(0, 5), 0);
    assert_eq!(selection_count(3, 5), 3);
    assert_eq!(selection_count(10, 5), 5);
    assert_eq!(selection_count(4, 0), 1);
}

#[test]
fn zero_use_count_still_selects_one_comp() {
    let subject = Subject::default();
    let policy = make_policy(json!({"arv_comp_use_count": 0}));
    let comps = vec![
        make_comp(json!({"id": "a", "price": 300000})),
        make_comp(json!({"id": "b", "price": 320000})),
    ];

    for version in BOTH_VERSIONS {
        let result = run(&subject, &comps, &policy, version);
        assert_eq!(result.selected_comp_ids.len(), 1);
        assert_eq!(result.selection_summary.policy_used.arv_comp_use_count, 0);
    }
}

#[test]
fn price_basis_without_subject_size() {
    let subject = Subject::default();
    let policy = make_policy(json!({"weights": {"sqft": 1}}));
    let comps = vec![
        make_comp(json!({"id": "a", "price": 300000, "price_adjusted": 310000})),
        make_comp(json!({"id": "b", "price": 320000})),
        make_comp(json!({"id": "c", "price": "330000"})),
    ];

    for version in BOTH_VERSIONS {
        let result = run(&subject, &comps, &policy, version);

        assert_eq!(result.suggested_arv, Some(320000.0));
        assert_eq!(result.suggested_arv_range_low, Some(310000.0));
        assert_eq!(result.suggested_arv_range_high, Some(330000.0));

        let adjusted = result
            .selected_comps
            .iter()
            .find(|c| c.id.as_str() == "a")
            .unwrap();
        assert_eq!(adjusted.evidence.price, Some(EvidenceSource::PriceAdjusted));
        assert_eq!(adjusted.ppsf, None);
    }
}

#[test]
fn non_ppsf_selection_method_values_by_price() {
    let subject = Subject {
        sqft: Some(2000.0),
        ..Subject::default()
    };
    let comps = vec![
        make_comp(json!({"id": "a", "price": 300000, "sqft": 1000})),
        make_comp(json!({"id": "b", "price": 320000, "sqft": 1000})),
        make_comp(json!({"id": "c", "price": 340000, "sqft": 1000})),
    ];

    let ppsf_policy = make_policy(json!({"weights": {"bed_bath": 1}}));
    let price_policy = make_policy(json!({"weights": {"bed_bath": 1}, "selection_method": "comps_median"}));

    let by_ppsf = run(&subject, &comps, &ppsf_policy, SelectionVersion::V1_1);
    assert_eq!(by_ppsf.suggested_arv, Some(640000.0));

    let by_price = run(&subject, &comps, &price_policy, SelectionVersion::V1_1);
    assert_eq!(by_price.suggested_arv, Some(320000.0));
}

#[test]
fn unknown_range_method_yields_no_range() {
    let subject = Subject::default();
    let policy = make_policy(json!({"range_method": "iqr"}));
    let comps = vec![
        make_comp(json!({"id": "a", "price": 300000})),
        make_comp(json!({"id": "b", "price": 320000})),
    ];

    let result = run(&subject, &comps, &policy, SelectionVersion::V1_3);
    assert!(result.suggested_arv.is_some());
    assert_eq!(result.suggested_arv_range_low, None);
    assert_eq!(result.suggested_arv_range_high, None);
}

#[test]
fn unpriced_comps_are_selected_but_not_valued() {
    let subject = Subject::default();
    let policy = SelectionPolicy::default();
    let comps = vec![
        make_comp(json!({"id": "a", "address": "1 Main St"})),
        make_comp(json!({"id": "b", "address": "2 Main St", "price": "n/a"})),
    ];

    for version in BOTH_VERSIONS {
        let result = run(&subject, &comps, &policy, version);
        assert_eq!(result.selected_comp_ids.len(), 2);
        assert_eq!(result.suggested_arv, None);
        assert_eq!(result.suggested_arv_range_low, None);
        assert_eq!(result.suggested_arv_range_high, None);
    }
}

#[test]
fn recency_reads_days_derived_from_the_sale_date() {
    // Only recency is weighted; the window defaults to 365 days
    let policy = make_policy(json!({"weights": {"recency": 1}}));
    let comps = vec![
        make_comp(json!({"id": "explicit", "price": 300000, "days_old": 300})),
        make_comp(json!({"id": "derived", "price": 310000, "close_date": "2024-11-01", "as_of": "2024-12-01"})),
        make_comp(json!({"id": "undated", "price": 320000})),
    ];

    for version in BOTH_VERSIONS {
        let result = run(&Subject::default(), &comps, &policy, version);
        assert_eq!(ids(&result), vec!["derived", "undated", "explicit"], "{version}");

        let derived = &result.selected_comps[0];
        assert_eq!(derived.days_old, Some(30.0));
        assert_eq!(derived.evidence.days_old, Some(EvidenceSource::SaleDateToAsOf));
        assert!((derived.components.recency - (1.0 - 30.0 / 365.0)).abs() < 1e-12);
        assert!((derived.score - 100.0 * (1.0 - 30.0 / 365.0)).abs() < 1e-9);

        let undated = &result.selected_comps[1];
        assert_eq!(undated.days_old, None);
        assert_eq!(undated.components.recency, 0.5);

        let explicit = &result.selected_comps[2];
        assert_eq!(explicit.evidence.days_old, Some(EvidenceSource::DaysOld));
        assert!((explicit.components.recency - (1.0 - 300.0 / 365.0)).abs() < 1e-12);
    }
}

#![allow(clippy::all)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use sift::scan::{Column, IndexKey, ScanResult};
use sift::{
    Catalog, EvalOptions, Evaluator, Expr, KeyOrdering, MemoryScanClient, ParamBindings, RowSet,
    ScanClient, ScanRange, SiftError,
};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// People fixture: ed is 17, alice and bob are 18, carol is 25, dave is 40.
/// alice, carol and ed live in NYC; bob in SEA; dave in LA.
/// Scores: dave 3, alice and bob 5, carol 7. `notes` has no index.
fn people_store() -> MemoryScanClient {
    init_logging();
    let store = MemoryScanClient::new();
    for (person, age) in [
        ("ed", "17"),
        ("alice", "18"),
        ("bob", "18"),
        ("carol", "25"),
        ("dave", "40"),
    ] {
        store.put_index_entry("People_age_idx", age, person);
        store.put("People", person, "id", person);
    }
    for (person, city) in [
        ("alice", "NYC"),
        ("carol", "NYC"),
        ("ed", "NYC"),
        ("bob", "SEA"),
        ("dave", "LA"),
    ] {
        store.put_index_entry("People_city_idx", city, person);
    }
    for (person, score) in [("dave", "3"), ("alice", "5"), ("bob", "5"), ("carol", "7")] {
        store.put_index_entry("People_score_idx", score, person);
    }
    store
}

fn people_catalog() -> Catalog {
    Catalog::new("People")
        .with_utf8_index("age", "People_age_idx")
        .with_utf8_index("city", "People_city_idx")
        .with_utf8_index("score", "People_score_idx")
        .with_utf8_index("name", "People_name_idx")
        .with_unindexed_field("notes")
}

fn keys(names: &[&str]) -> RowSet {
    names.iter().map(|n| (*n).to_owned()).collect()
}

/// Wraps the memory store and counts the scans the evaluator issues.
struct CountingClient<'a> {
    inner: &'a MemoryScanClient,
    points: AtomicUsize,
    ranges: AtomicUsize,
}

impl<'a> CountingClient<'a> {
    fn new(inner: &'a MemoryScanClient) -> Self {
        Self {
            inner,
            points: AtomicUsize::new(0),
            ranges: AtomicUsize::new(0),
        }
    }

    fn counts(&self) -> (usize, usize) {
        (
            self.points.load(Ordering::Relaxed),
            self.ranges.load(Ordering::Relaxed),
        )
    }
}

impl ScanClient for CountingClient<'_> {
    fn point_scan(
        &self,
        family: &str,
        row_key: &[u8],
        max_columns: usize,
    ) -> ScanResult<Vec<Column>> {
        self.points.fetch_add(1, Ordering::Relaxed);
        self.inner.point_scan(family, row_key, max_columns)
    }

    fn range_scan(
        &self,
        family: &str,
        range: &ScanRange,
        max_columns_per_row: usize,
    ) -> ScanResult<Vec<(IndexKey, Vec<Column>)>> {
        self.ranges.fetch_add(1, Ordering::Relaxed);
        self.inner.range_scan(family, range, max_columns_per_row)
    }
}

/// A store that refuses every scan.
struct FailingClient;

impl ScanClient for FailingClient {
    fn point_scan(&self, _: &str, _: &[u8], _: usize) -> ScanResult<Vec<Column>> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "store down").into())
    }

    fn range_scan(
        &self,
        _: &str,
        _: &ScanRange,
        _: usize,
    ) -> ScanResult<Vec<(IndexKey, Vec<Column>)>> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "store down").into())
    }
}

#[test]
fn indexed_and_is_one_range_plus_one_point_scan() {
    let store = people_store();
    let client = CountingClient::new(&store);
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &client);

    let predicate = Expr::and(
        Expr::ge(Expr::field("age"), Expr::literal(18i64)),
        Expr::eq(Expr::field("city"), Expr::literal("NYC")),
    );
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&["alice", "carol"]));
    assert_eq!(client.counts(), (1, 1));
}

#[test]
fn like_gives_up_without_scanning() {
    let store = people_store();
    let client = CountingClient::new(&store);
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &client);

    let predicate = Expr::like("name", "A%");
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(result.requires_in_memory);
    assert!(result.candidate_keys.is_none());
    assert_eq!(client.counts(), (0, 0));
}

#[test]
fn not_equal_unions_the_two_excluding_ranges() {
    let store = people_store();
    let client = CountingClient::new(&store);
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &client);

    let predicate = Expr::ne(Expr::field("score"), Expr::literal(5i64));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&["carol", "dave"]));
    assert_eq!(client.counts(), (0, 2));
}

#[test]
fn unindexed_field_degrades_to_memory_pass() {
    let store = people_store();
    let client = CountingClient::new(&store);
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &client);

    let predicate = Expr::eq(Expr::field("notes"), Expr::literal("x"));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(result.requires_in_memory);
    assert!(result.candidate_keys.is_none());
    assert_eq!(client.counts(), (0, 0));
}

#[test]
fn strict_and_inclusive_bounds() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);
    let params = ParamBindings::new();

    let cases: [(Expr, &[&str]); 4] = [
        (
            Expr::gt(Expr::field("age"), Expr::literal(18i64)),
            &["carol", "dave"],
        ),
        (Expr::lt(Expr::field("age"), Expr::literal(18i64)), &["ed"]),
        (
            Expr::le(Expr::field("age"), Expr::literal(18i64)),
            &["alice", "bob", "ed"],
        ),
        (
            Expr::ge(Expr::field("age"), Expr::literal(25i64)),
            &["carol", "dave"],
        ),
    ];
    for (predicate, expected) in cases {
        let result = evaluator.evaluate(&predicate, &params).unwrap();
        assert!(!result.requires_in_memory);
        assert_eq!(result.candidate_keys.unwrap(), keys(expected));
    }
}

#[test]
fn or_unions_indexed_branches() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::or(
        Expr::eq(Expr::field("city"), Expr::literal("SEA")),
        Expr::eq(Expr::field("city"), Expr::literal("LA")),
    );
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&["bob", "dave"]));
}

#[test]
fn or_with_an_unrestricted_branch_is_unrestricted() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::or(
        Expr::eq(Expr::field("city"), Expr::literal("NYC")),
        Expr::eq(Expr::field("notes"), Expr::literal("x")),
    );
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(result.requires_in_memory);
    assert!(result.candidate_keys.is_none());
}

#[test]
fn and_with_an_unrestricted_branch_keeps_the_other_restriction() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::and(
        Expr::eq(Expr::field("city"), Expr::literal("NYC")),
        Expr::eq(Expr::field("notes"), Expr::literal("x")),
    );
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(result.requires_in_memory);
    assert_eq!(
        result.candidate_keys.unwrap(),
        keys(&["alice", "carol", "ed"])
    );
}

#[test]
fn parameters_resolve_to_bound_values() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::ge(Expr::field("age"), Expr::param("min"));
    let params = ParamBindings::new().bind("min", 18i64);
    let result = evaluator.evaluate(&predicate, &params).unwrap();

    assert!(!result.requires_in_memory);
    assert_eq!(
        result.candidate_keys.unwrap(),
        keys(&["alice", "bob", "carol", "dave"])
    );
}

#[test]
fn invocation_loads_the_full_extent_and_falls_back() {
    let store = people_store();
    let client = CountingClient::new(&store);
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &client);

    let predicate = Expr::invoke("name", "startsWith", vec![Expr::literal("A")]);
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert_eq!(store.row_count("People"), 5);
    assert!(result.requires_in_memory);
    assert_eq!(
        result.candidate_keys.unwrap(),
        keys(&["alice", "bob", "carol", "dave", "ed"])
    );
    assert_eq!(client.counts(), (0, 1));
}

#[test]
fn empty_scan_result_is_definitive_not_unknown() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::eq(Expr::field("city"), Expr::literal("Nowhere"));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();
    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&[]));

    // ANDing a definitive empty set with anything stays empty.
    let predicate = Expr::and(
        Expr::eq(Expr::field("city"), Expr::literal("Nowhere")),
        Expr::ge(Expr::field("age"), Expr::literal(18i64)),
    );
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();
    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&[]));
}

#[test]
fn unknown_field_is_a_configuration_error() {
    let store = people_store();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::eq(Expr::field("missing"), Expr::literal("x"));
    let err = evaluator
        .evaluate(&predicate, &ParamBindings::new())
        .unwrap_err();
    assert!(matches!(err, SiftError::UnknownField(path) if path == "missing"));
}

#[test]
fn scan_failure_aborts_the_whole_evaluation() {
    init_logging();
    let catalog = people_catalog();
    let evaluator = Evaluator::new(&catalog, &FailingClient);

    let predicate = Expr::eq(Expr::field("city"), Expr::literal("NYC"));
    let err = evaluator
        .evaluate(&predicate, &ParamBindings::new())
        .unwrap_err();
    assert!(matches!(err, SiftError::Scan { index, .. } if index == "People_city_idx"));
}

#[test]
fn capped_scan_is_still_treated_as_complete() {
    let store = people_store();
    let catalog = people_catalog();
    let options = EvalOptions { scan_limit: 2 };
    let evaluator = Evaluator::with_options(&catalog, &store, options);

    // Only the first two index rows (ages 18 and 25) fit under the cap.
    let predicate = Expr::ge(Expr::field("age"), Expr::literal(18i64));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();

    assert!(!result.requires_in_memory);
    assert_eq!(
        result.candidate_keys.unwrap(),
        keys(&["alice", "bob", "carol"])
    );
}

#[test]
fn fixed_binary_ordering_drives_bound_adjustment() {
    init_logging();
    let store = MemoryScanClient::new();
    store.put_index_entry("Machines_level_idx", "09", "m1");
    store.put_index_entry("Machines_level_idx", "10", "m2");
    store.put_index_entry("Machines_level_idx", "11", "m3");
    let catalog = Catalog::new("Machines").with_index(
        "level",
        "Machines_level_idx",
        KeyOrdering::FixedBinary,
    );
    let evaluator = Evaluator::new(&catalog, &store);

    let predicate = Expr::gt(Expr::field("level"), Expr::literal("09"));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();
    assert!(!result.requires_in_memory);
    assert_eq!(result.candidate_keys.unwrap(), keys(&["m2", "m3"]));

    let predicate = Expr::lt(Expr::field("level"), Expr::literal("10"));
    let result = evaluator.evaluate(&predicate, &ParamBindings::new()).unwrap();
    assert_eq!(result.candidate_keys.unwrap(), keys(&["m1"]));
}

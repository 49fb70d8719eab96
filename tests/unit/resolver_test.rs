//! Unit tests for location-to-time resolution.

use deskmate::clock::{ClockError, TimeSource};
use deskmate::TimeResolver;

fn resolver() -> TimeResolver {
    TimeResolver::new("Asia/Ho_Chi_Minh", None).expect("valid home timezone")
}

#[test]
fn test_known_cities_resolve_locally() {
    let resolver = resolver();

    for query in ["Tokyo", "seoul", "what time is it in London"] {
        let resolved = resolver.resolve(query).expect("resolves");
        assert_eq!(resolved.source, TimeSource::LocalTable, "query {query:?}");
    }
}

#[test]
fn test_city_and_country_share_timezone() {
    let resolver = resolver();

    let tokyo = resolver.resolve("tokyo").unwrap();
    let japan = resolver.resolve("japan").unwrap();
    assert_eq!(tokyo.zone_name, japan.zone_name);
    assert_eq!(tokyo.time.offset(), japan.time.offset());
}

#[test]
fn test_vietnamese_queries_resolve_hanoi() {
    let resolver = resolver();

    // Both the diacritic and plain spellings are in the table.
    for query in ["mấy giờ rồi ở hà nội", "may gio roi o ha noi"] {
        let resolved = resolver.resolve(query).expect("resolves");
        assert_eq!(resolved.zone_name, "Asia/Ho_Chi_Minh", "query {query:?}");
        assert_eq!(resolved.source, TimeSource::LocalTable);
    }
}

#[test]
fn test_unmapped_location_is_an_expected_error() {
    let resolver = resolver();
    match resolver.resolve("wakanda") {
        Err(ClockError::UnknownLocation(query)) => assert_eq!(query, "wakanda"),
        other => panic!("expected UnknownLocation, got {other:?}"),
    }
}

#[test]
fn test_coordinate_only_city_needs_api_key() {
    let resolver = resolver();
    assert!(matches!(
        resolver.resolve("dubai"),
        Err(ClockError::ApiKeyMissing)
    ));
}

#[test]
fn test_summary_formatting() {
    let resolver = resolver();
    let summary = resolver.resolve("bangkok").unwrap().summary();
    assert!(summary.starts_with("bangkok: "), "got {summary:?}");
    assert!(summary.contains("Asia/Bangkok"), "got {summary:?}");
}

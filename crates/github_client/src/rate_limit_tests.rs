use super::*;
use chrono::Utc;
use http::HeaderValue;

#[test]
fn test_from_headers_reads_all_values() {
    let mut headers = HeaderMap::new();
    headers.insert(REMAINING_HEADER, HeaderValue::from_static("4987"));
    headers.insert(LIMIT_HEADER, HeaderValue::from_static("5000"));
    headers.insert(RESET_HEADER, HeaderValue::from_static("1700000000"));

    let status = RateLimitStatus::from_headers(&headers);

    assert_eq!(status.remaining.as_deref(), Some("4987"));
    assert_eq!(status.limit.as_deref(), Some("5000"));
    let reset = status.reset.expect("reset should parse");
    assert_eq!(reset.with_timezone(&Utc).timestamp(), 1_700_000_000);
}

#[test]
fn test_from_headers_missing_values() {
    let status = RateLimitStatus::from_headers(&HeaderMap::new());

    assert_eq!(status, RateLimitStatus::default());
}

#[test]
fn test_non_numeric_reset_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(REMAINING_HEADER, HeaderValue::from_static("10"));
    headers.insert(RESET_HEADER, HeaderValue::from_static("soon"));

    let status = RateLimitStatus::from_headers(&headers);

    assert_eq!(status.remaining.as_deref(), Some("10"));
    assert!(status.reset.is_none());
}

#[test]
fn test_reset_to_local_accepts_fractional_seconds() {
    let reset = reset_to_local("1700000000.75").expect("reset should parse");

    assert_eq!(reset.with_timezone(&Utc).timestamp(), 1_700_000_000);
}

#[test]
fn test_reset_to_local_rejects_non_finite() {
    assert!(reset_to_local("NaN").is_none());
    assert!(reset_to_local("inf").is_none());
    assert!(reset_to_local("").is_none());
}

//! Unit tests for the github_client crate.

use super::*; // Import items from lib.rs
use serde_json::json;
use std::time::Instant;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// --- Test Helpers ---

fn create_test_client(mock_server: &MockServer) -> GitHubClient {
    let octocrab = create_token_client("test-token", Some(&mock_server.uri()))
        .expect("Failed to build test client");
    GitHubClient::new(octocrab)
}

fn repository_values(id: u64, full_name: &str, sensitive: Option<&str>) -> serde_json::Value {
    let properties = match sensitive {
        Some(value) => json!([{ "property_name": "sensitive", "value": value }]),
        None => json!([]),
    };
    json!({
        "repository_id": id,
        "repository_name": full_name.split('/').nth(1).unwrap_or(full_name),
        "repository_full_name": full_name,
        "properties": properties
    })
}

fn github_error(message: &str) -> serde_json::Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}

// --- Route helpers ---

#[test]
fn test_property_values_route_without_query() {
    assert_eq!(
        property_values_route("acme", None),
        "/orgs/acme/properties/values?per_page=100"
    );
}

#[test]
fn test_installation_repository_route() {
    assert_eq!(
        installation_repository_route(42, 1296269),
        "/user/installations/42/repositories/1296269"
    );
}

#[tokio::test]
async fn test_create_token_client_rejects_invalid_base_uri() {
    let result = create_token_client("test-token", Some("not a uri"));

    assert!(matches!(result, Err(Error::InvalidUri(_))));
}

// --- Listing ---

#[tokio::test]
async fn test_list_repository_property_values_single_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/properties/values"))
        .and(query_param("per_page", "100"))
        .and(query_param("repository_query", "archived:false"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "4999")
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-reset", "1700000000")
                .set_body_json(json!([
                    repository_values(1, "acme/a", Some("true")),
                    repository_values(2, "acme/b", None)
                ])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .list_repository_property_values("acme", Some("archived:false"))
        .await;

    let values = result.expect("listing should succeed");
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].repository_id, 1);
    assert_eq!(values[0].repository_full_name, "acme/a");
    assert_eq!(values[1].repository_id, 2);
    assert!(values[1].properties.is_empty());
}

#[tokio::test]
async fn test_list_repository_property_values_follows_next_links() {
    let mock_server = MockServer::start().await;
    let next_link = format!(
        "<{}/orgs/acme/properties/values?per_page=100&page=2>; rel=\"next\"",
        mock_server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/orgs/acme/properties/values"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next_link.as_str())
                .set_body_json(json!([repository_values(1, "acme/a", Some("true"))])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/properties/values"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([repository_values(2, "acme/b", Some("false"))])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let values = client
        .list_repository_property_values("acme", None)
        .await
        .expect("listing should succeed");

    let ids: Vec<u64> = values.iter().map(|v| v.repository_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_list_repository_property_values_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/missing/properties/values"))
        .respond_with(ResponseTemplate::new(404).set_body_json(github_error("Not Found")))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.list_repository_property_values("missing", None).await;

    assert!(matches!(result, Err(Error::NotFound)));
}

// --- Installation repositories ---

#[tokio::test]
async fn test_add_repository_to_installation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/installations/42/repositories/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let status = client
        .add_repository_to_installation(42, 7)
        .await
        .expect("add should succeed");

    assert_eq!(status, 204);
}

#[tokio::test]
async fn test_remove_repository_from_installation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/user/installations/42/repositories/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let status = client
        .remove_repository_from_installation(42, 7)
        .await
        .expect("remove should succeed");

    assert_eq!(status, 204);
}

#[tokio::test]
async fn test_remove_repository_from_installation_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/user/installations/42/repositories/7"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(github_error("Must have admin rights")),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.remove_repository_from_installation(42, 7).await;

    match result {
        Err(Error::ApiError { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Must have admin rights");
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_secondary_rate_limit_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/installations/42/repositories/7"))
        .respond_with(ResponseTemplate::new(403).set_body_json(github_error(
            "You have exceeded a secondary rate limit. Please wait a few minutes.",
        )))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.add_repository_to_installation(42, 7).await;

    assert!(matches!(result, Err(Error::RateLimitExceeded)));
}

// --- Pacing ---

#[tokio::test]
async fn test_pacing_delay_applies_after_each_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/user/installations/1/repositories/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).with_pacing(Duration::from_millis(100));

    let started = Instant::now();
    client
        .remove_repository_from_installation(1, 1)
        .await
        .expect("first remove should succeed");
    let after_first = started.elapsed();
    client
        .remove_repository_from_installation(1, 1)
        .await
        .expect("second remove should succeed");
    let after_second = started.elapsed();

    assert!(after_first >= Duration::from_millis(100));
    assert!(after_second >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_pacing_delay_applies_to_failed_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/installations/1/repositories/1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(github_error("Validation Failed")))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).with_pacing(Duration::from_millis(100));

    let started = Instant::now();
    let result = client.add_repository_to_installation(1, 1).await;

    assert!(result.is_err());
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_client_defaults_to_no_pacing() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    assert_eq!(client.pacing(), Duration::ZERO);
    assert_eq!(client.slot(), 0);
}

// --- Telemetry ---

#[tokio::test]
#[traced_test]
async fn test_request_logs_url_and_rate_limit_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/properties/values"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "4999")
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-reset", "1700000000")
                .set_body_json(json!([])),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    client
        .list_repository_property_values("acme", None)
        .await
        .expect("listing should succeed");

    assert!(logs_contain("/orgs/acme/properties/values"));
    assert!(logs_contain("status=200"));
    assert!(logs_contain("x-ratelimit-remaining: 4999"));
    assert!(logs_contain("x-ratelimit-limit: 5000"));
    assert!(logs_contain("x-ratelimit-reset: 2023-11-1"));
}

#[tokio::test]
#[traced_test]
async fn test_unparseable_reset_header_skips_only_reset_line() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/user/installations/9/repositories/1"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("x-ratelimit-remaining", "12")
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-reset", "soon"),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    client
        .remove_repository_from_installation(9, 1)
        .await
        .expect("remove should succeed");

    assert!(logs_contain("x-ratelimit-remaining: 12"));
    assert!(logs_contain("x-ratelimit-limit: 5000"));
    assert!(!logs_contain("x-ratelimit-reset"));
}

#[tokio::test]
#[traced_test]
async fn test_missing_rate_limit_headers_are_logged_as_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/installations/9/repositories/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    client
        .add_repository_to_installation(9, 1)
        .await
        .expect("add should succeed");

    assert!(logs_contain("x-ratelimit-remaining: unknown"));
    assert!(logs_contain("x-ratelimit-limit: unknown"));
    assert!(!logs_contain("x-ratelimit-reset"));
}

#[tokio::test]
#[traced_test]
async fn test_single_token_client_logs_without_slot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/installations/9/repositories/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    client
        .add_repository_to_installation(9, 1)
        .await
        .expect("add should succeed");

    assert!(logs_contain("x-ratelimit-remaining"));
    assert!(!logs_contain("token{"));
    assert!(!logs_contain("slot="));
}

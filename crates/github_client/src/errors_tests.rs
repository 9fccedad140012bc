use super::*;
use std::error::Error as StdError;

#[test]
fn test_api_error() {
    let error = Error::ApiError {
        status: 422,
        message: "Validation Failed".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "API request failed with status 422: Validation Failed"
    );
    assert!(error.source().is_none());
}

#[test]
fn test_auth_error() {
    let error = Error::AuthError("Bad credentials".to_string());

    assert_eq!(
        error.to_string(),
        "Failed to authenticate or initialize GitHub client: Bad credentials"
    );
    assert!(error.source().is_none());
}

#[test]
fn test_invalid_response_error() {
    let error = Error::InvalidResponse;

    assert_eq!(error.to_string(), "Invalid response format");
    assert!(error.source().is_none());
}

#[test]
fn test_deserialization_error_keeps_source() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error = Error::from(json_error);

    assert!(error.to_string().starts_with("Failed to deserialize GitHub response"));
    assert!(error.source().is_some());
}

#[test]
fn test_from_status_not_found() {
    assert!(matches!(Error::from_status(404, "Not Found"), Error::NotFound));
}

#[test]
fn test_from_status_unauthorized() {
    match Error::from_status(401, "Bad credentials") {
        Error::AuthError(msg) => assert_eq!(msg, "Bad credentials"),
        other => panic!("Expected AuthError, got {other:?}"),
    }
}

#[test]
fn test_from_status_rate_limited() {
    assert!(matches!(
        Error::from_status(403, "API rate limit exceeded for user ID 1."),
        Error::RateLimitExceeded
    ));
    assert!(matches!(
        Error::from_status(
            429,
            "You have exceeded a secondary rate limit. Please wait a few minutes."
        ),
        Error::RateLimitExceeded
    ));
}

#[test]
fn test_from_status_forbidden_without_rate_limit_is_api_error() {
    match Error::from_status(403, "Resource not accessible by personal access token") {
        Error::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Resource not accessible by personal access token");
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[test]
fn test_error_is_send_sync() {
    // This test verifies that Error implements Send and Sync traits
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}

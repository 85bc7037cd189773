use chrono::{DateTime, Utc};
use fine_grained_permissions::{enrich, InMemoryPermissionStore, PERMISSIONS_CLAIM};
use get_booking::{handle, Booking, ErrorResponse, ProxyRequest};
use serde_json::{json, Value};

fn proxy_request(request_context: Value) -> ProxyRequest {
    serde_json::from_value(json!({
        "resource": "/booking",
        "path": "/booking",
        "httpMethod": "GET",
        "headers": { "Authorization": "eyJraWQiOi..." },
        "requestContext": request_context
    }))
    .expect("Failed to build proxy request")
}

fn with_claims(claims: Value) -> ProxyRequest {
    proxy_request(json!({
        "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
        "stage": "prod",
        "authorizer": { "claims": claims }
    }))
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T10:20:30Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn assert_forbidden(request: &ProxyRequest) {
    let response = handle(request, fixed_now()).expect("Handler failed");

    assert_eq!(403, response.status_code);
    let body: ErrorResponse = serde_json::from_str(&response.body).expect("Failed to read JSON");
    assert_eq!(body.message, "Forbidden");
}

#[test]
fn booking_returned_when_permission_present() {
    let request = with_claims(json!({
        "sub": "8f2c-44",
        "permissions": "booking:read,booking:write"
    }));

    let response = handle(&request, fixed_now()).expect("Handler failed");

    assert_eq!(200, response.status_code);
    assert_eq!(response.headers["Content-Type"], "application/json");
    let booking: Booking = serde_json::from_str(&response.body).expect("Failed to read JSON");
    assert_eq!(booking, Booking::sample(fixed_now()));
    assert_eq!(booking.id, "456");
    assert_eq!(booking.name, "Hotel California");
}

#[test]
fn forbidden_body_is_fixed_message() {
    let response = handle(&with_claims(json!({ "sub": "8f2c-44" })), fixed_now())
        .expect("Handler failed");
    let body: Value = serde_json::from_str(&response.body).expect("Failed to read JSON");
    assert_eq!(body, json!({ "message": "Forbidden" }));
}

#[test]
fn forbidden_without_request_context() {
    let request: ProxyRequest =
        serde_json::from_value(json!({ "path": "/booking" })).expect("Failed to build request");
    assert_forbidden(&request);
}

#[test]
fn forbidden_without_authorizer() {
    assert_forbidden(&proxy_request(json!({ "requestId": "abc" })));
}

#[test]
fn forbidden_when_claims_absent() {
    assert_forbidden(&proxy_request(json!({ "authorizer": { "claims": null } })));
}

#[test]
fn forbidden_when_permissions_claim_absent() {
    assert_forbidden(&with_claims(json!({ "sub": "8f2c-44" })));
}

#[test]
fn forbidden_when_permissions_lack_booking_read() {
    assert_forbidden(&with_claims(json!({ "permissions": "review:read,booking:write" })));
}

#[test]
fn forbidden_on_prefix_match_only() {
    assert_forbidden(&with_claims(json!({ "permissions": "booking:readers" })));
}

#[test]
fn forbidden_when_permissions_empty() {
    assert_forbidden(&with_claims(json!({ "permissions": "" })));
}

async fn issued_claims(groups: &[&str]) -> Value {
    let store = InMemoryPermissionStore::new()
        .with_record("booking-client", "User", ["booking:read"])
        .with_record("booking-client", "Guest", ["review:read"]);
    let event = serde_json::from_value(json!({
        "callerContext": { "clientId": "booking-client" },
        "request": {
            "userAttributes": { "sub": "8f2c-44" },
            "groupConfiguration": { "groupsToOverride": groups }
        }
    }))
    .expect("Failed to build trigger event");

    let event = enrich(&store, event).await.expect("Failed to enrich claims");
    let claims = event
        .response
        .claims_and_scope_override_details
        .access_token_generation
        .and_then(|details| details.claims_to_add_or_override)
        .expect("access token claims should be set");
    serde_json::to_value(claims).expect("Failed to serialize claims")
}

#[tokio::test]
async fn claims_issued_for_reader_group_are_allowed() {
    let claims = issued_claims(&["User", "Guest"]).await;
    assert!(claims.get(PERMISSIONS_CLAIM).is_some());

    let response = handle(&with_claims(claims), fixed_now()).expect("Handler failed");
    assert_eq!(200, response.status_code);
}

#[tokio::test]
async fn claims_issued_without_reader_group_are_forbidden() {
    let claims = issued_claims(&["Guest"]).await;
    assert_forbidden(&with_claims(claims));
}

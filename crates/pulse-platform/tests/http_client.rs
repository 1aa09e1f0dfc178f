//! Integration tests for the HTTP billing-platform client
//!
//! These tests use wiremock to simulate the platform's REST API and verify
//! pagination, authentication and error mapping.

use std::time::Duration;

use pulse_platform::{BillingPlatform, HttpPlatformClient, PlatformConfig, PlatformError};
use pulse_types::{MembershipStatus, PaymentStatus, TenantId};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_API_KEY: &str = "test-api-key";

fn tenant() -> TenantId {
    TenantId::parse("biz_test").unwrap()
}

fn client_for(server: &MockServer) -> HttpPlatformClient {
    let config = PlatformConfig::new(server.uri(), TEST_API_KEY)
        .with_page_size(2)
        .with_request_timeout(Duration::from_secs(2));
    HttpPlatformClient::new(config).unwrap()
}

fn membership_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "status": status,
        "created_at": 1_700_000_000,
        "canceled_at": null,
        "expires_at": null,
        "total_spend": "29.00",
        "plan": { "id": "plan_monthly" },
        "member": { "id": format!("user_{id}"), "email": null, "name": null }
    })
}

#[tokio::test]
async fn test_list_memberships_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memberships"))
        .and(query_param("company_id", "biz_test"))
        .and(query_param("page", "1"))
        .and(query_param("per", "2"))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [membership_json("mem_1", "active"), membership_json("mem_2", "trialing")],
            "pagination": { "current_page": 1, "total_pages": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/memberships"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [membership_json("mem_3", "canceled")],
            "pagination": { "current_page": 2, "total_pages": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let memberships = client_for(&server).list_memberships(&tenant()).await.unwrap();

    assert_eq!(memberships.len(), 3);
    assert_eq!(memberships[0].status, MembershipStatus::Active);
    assert_eq!(memberships[2].status, MembershipStatus::Canceled);
    assert_eq!(memberships[0].plan_id.as_deref(), Some("plan_monthly"));
    assert!(memberships.iter().all(|m| m.plan.is_none()));
}

#[tokio::test]
async fn test_list_plans_decodes_prices() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "plan_monthly", "raw_renewal_price": 2900, "raw_initial_price": 0,
                  "billing_period": 30, "plan_type": "renewal", "base_currency": "usd" },
                { "id": "plan_lifetime", "raw_renewal_price": 0, "raw_initial_price": 50000,
                  "billing_period": null, "plan_type": "one_time", "base_currency": "usd" }
            ],
            "pagination": { "current_page": 1, "total_pages": 1 }
        })))
        .mount(&server)
        .await;

    let plans = client_for(&server).list_plans(&tenant()).await.unwrap();

    assert_eq!(plans.len(), 2);
    assert!(plans[0].is_recurring());
    assert!(!plans[1].is_recurring());
    assert_eq!(plans[0].renewal_price().to_string(), "29.00");
}

#[tokio::test]
async fn test_list_payments_tolerates_unknown_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "pay_1", "membership": { "id": "mem_1" }, "raw_amount": 2900,
                  "currency": "usd", "status": "paid", "created_at": 1_700_000_000,
                  "paid_at": 1_700_000_100 },
                { "id": "pay_2", "membership": null, "raw_amount": 100,
                  "currency": "usd", "status": "disputed", "created_at": 1_700_000_000,
                  "paid_at": null }
            ]
        })))
        .mount(&server)
        .await;

    let payments = client_for(&server).list_payments(&tenant()).await.unwrap();

    assert_eq!(payments[0].status, PaymentStatus::Paid);
    assert_eq!(payments[0].membership_id.as_deref(), Some("mem_1"));
    assert_eq!(payments[1].status, PaymentStatus::Other);
}

#[tokio::test]
async fn test_get_company() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/biz_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "biz_test", "title": "Test Co", "created_at": 1_690_000_000
        })))
        .mount(&server)
        .await;

    let company = client_for(&server).get_company(&tenant()).await.unwrap();
    assert_eq!(company.title, "Test Co");
    assert_eq!(company.created_at, Some(1_690_000_000));
}

#[tokio::test]
async fn test_rate_limit_maps_to_retryable_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_plans(&tenant()).await.unwrap_err();

    match err {
        PlatformError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("Expected RateLimited, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memberships"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).list_memberships(&tenant()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Unavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_company_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/biz_test"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).get_company(&tenant()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unauthorized_is_not_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_plans(&tenant()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Api { status: 401, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unknown_membership_status_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memberships"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [membership_json("mem_1", "hibernating")]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).list_memberships(&tenant()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Malformed(_)));
}

#[tokio::test]
async fn test_invalid_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_plans(&tenant()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).list_plans(&tenant()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Timeout(_)));
    assert!(err.is_retryable());
}

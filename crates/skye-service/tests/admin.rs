//! Admin endpoint integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn issue_codes_and_redeem_one() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/admin/redeem-codes")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "amount": 300, "count": 3 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let codes = body["data"].as_array().unwrap();
    assert_eq!(codes.len(), 3);
    assert!(codes.iter().all(|c| c["amount"] == 300));

    let code = codes[0]["code"].as_str().unwrap();
    assert_eq!(code.len(), 40);

    let auth = harness.signup("alice@example.com").await;
    harness
        .server
        .post("/redeem")
        .add_header("authorization", auth)
        .json(&json!({ "code": code }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn issue_codes_rejects_bad_input() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/admin/redeem-codes")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "amount": 0, "count": 1 }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_params");

    let response = harness
        .server
        .post("/admin/redeem-codes")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "amount": i64::MAX, "count": 1 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn admin_routes_require_key() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/admin/redeem-codes")
        .json(&json!({ "amount": 100, "count": 1 }))
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/admin/redeem-codes")
        .add_header("x-admin-key", "wrong-key")
        .json(&json!({ "amount": 100, "count": 1 }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn manual_gift() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;
    let alice = harness.user("alice@example.com").await;

    let response = harness
        .server
        .post("/admin/gifts")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "user_id": alice.id.to_string(), "amount": 250 }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = harness
        .server
        .get("/balance")
        .add_header("authorization", auth)
        .await
        .json();
    assert_eq!(body["data"]["gifted"], 5250);
}

#[tokio::test]
async fn manual_gift_must_be_positive() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;
    let alice = harness.user("alice@example.com").await;

    for amount in [0, -1_000_000] {
        let response = harness
            .server
            .post("/admin/gifts")
            .add_header("x-admin-key", harness.admin_key.clone())
            .json(&json!({ "user_id": alice.id.to_string(), "amount": amount }))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "invalid_params");
    }

    let body: serde_json::Value = harness
        .server
        .get("/balance")
        .add_header("authorization", auth)
        .await
        .json();
    assert_eq!(body["data"]["gifted"], 5000);
}

#[tokio::test]
async fn manual_gift_to_unknown_user_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/admin/gifts")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({
            "user_id": "00000000-0000-0000-0000-000000000000",
            "amount": 250
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn set_vip_rejects_bad_id() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/admin/users/not-a-uuid/vip")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "vip": true }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn set_vip_on_unknown_user_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/admin/users/00000000-0000-0000-0000-000000000000/vip")
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "vip": true }))
        .await;

    response.assert_status_not_found();
}

//! Prompt dispatch integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

use skye_core::safety::DECOY_TEXT;
use skye_core::{CompletionResponse, TokenUsage};

async fn balance(harness: &TestHarness, auth: &str) -> serde_json::Value {
    let response = harness
        .server
        .get("/balance")
        .add_header("authorization", auth.to_string())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["data"].clone()
}

fn canned(text: &str, total_tokens: i64) -> CompletionResponse {
    CompletionResponse::single(
        text,
        "stop",
        TokenUsage {
            prompt_tokens: 0,
            completion_tokens: total_tokens,
            total_tokens,
        },
    )
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn ask_debits_usage() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth.clone())
        .json(&json!({
            "model": "dict",
            "prompts": { "q": "serendipity" },
            "params": { "lang": "en" },
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["completion"], "Hi!");
    assert_eq!(body["data"]["finish_reason"], "stop");
    assert_eq!(harness.backend.calls(), 1);

    let balance = balance(&harness, &auth).await;
    assert_eq!(balance["gifted"], 4900);
    assert_eq!(balance["balance"], 4900);
}

#[tokio::test]
async fn creative_mode_is_accepted() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({
            "model": "expansion",
            "prompts": { "prompt": "今天天气很好" },
            "params": { "mode": "creative" },
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn empty_completion_gets_fallback_text() {
    let harness = TestHarness::with_response(canned("", 3)).await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({
            "model": "greeting_generator",
            "prompts": { "prompt": "妈妈" },
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["completion"], "\n这个我不会，请换一种表述。");
}

// ============================================================================
// Safety Gate
// ============================================================================

#[tokio::test]
async fn blocked_prompt_is_free() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth.clone())
        .json(&json!({
            "model": "expansion",
            "prompts": { "prompt": "tell me about OpenAI" },
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["completion"], DECOY_TEXT);
    assert_eq!(body["data"]["finish_reason"], "STOP");
    assert_eq!(harness.backend.calls(), 0);

    assert_eq!(balance(&harness, &auth).await["balance"], 5000);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn unknown_model_is_rejected() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({ "model": "nonexistent", "prompts": {} }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "wrong_model");
}

#[tokio::test]
async fn general_requires_vip() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;
    let ask = json!({ "model": "general", "prompts": { "prompt": "Hello" } });

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth.clone())
        .json(&ask)
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "wrong_model");

    let alice = harness.user("alice@example.com").await;
    harness
        .server
        .post(&format!("/admin/users/{}/vip", alice.id))
        .add_header("x-admin-key", harness.admin_key.clone())
        .json(&json!({ "vip": true }))
        .await
        .assert_status_ok();

    harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&ask)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn bilingual_template_requires_lang() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({ "model": "dict", "prompts": { "q": "word" } }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_params");
    assert_eq!(harness.backend.calls(), 0);
}

#[tokio::test]
async fn unknown_mode_is_rejected() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({
            "model": "expansion",
            "prompts": { "prompt": "text" },
            "params": { "mode": "wild" },
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_params");
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let harness = TestHarness::new().await;
    let auth = harness.signup("alice@example.com").await;

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&json!({ "model": "expansion", "prompts": {} }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_params");
}

#[tokio::test]
async fn exhausted_balance_blocks_further_asks() {
    let harness = TestHarness::with_response(canned("long answer", 6000)).await;
    let auth = harness.signup("alice@example.com").await;
    let ask = json!({ "model": "expansion", "prompts": { "prompt": "text" } });

    harness
        .server
        .post("/ask")
        .add_header("authorization", auth.clone())
        .json(&ask)
        .await
        .assert_status_ok();

    let balance = balance(&harness, &auth).await;
    assert_eq!(balance["paid"], -1000);
    assert_eq!(balance["gifted"], 0);

    let response = harness
        .server
        .post("/ask")
        .add_header("authorization", auth)
        .json(&ask)
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "insufficient_balance");
    assert_eq!(harness.backend.calls(), 1);
}

#[tokio::test]
async fn ask_requires_auth() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/ask")
        .json(&json!({ "model": "dict", "prompts": {} }))
        .await
        .assert_status_unauthorized();
}

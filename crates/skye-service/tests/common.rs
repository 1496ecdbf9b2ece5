//! Common test utilities for skye integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use skye_core::{CompletionResponse, RedeemCode, User};
use skye_service::bootstrap::ensure_seed_account;
use skye_service::{create_router, AppState, CannedBackend, SeedAccount, ServiceConfig};
use skye_store::{MemoryStore, Store};

/// Invitation code owned by the seed account.
pub const SEED_CODE: &str = "SEED-0000-0000-0000";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for fixtures.
    pub store: Arc<MemoryStore>,
    /// The completion backend behind `/ask`.
    pub backend: Arc<CannedBackend>,
    /// The self-invited seed account.
    pub root: User,
    /// The admin API key.
    pub admin_key: String,
}

impl TestHarness {
    /// Create a harness with canned completions.
    pub async fn new() -> Self {
        Self::with_backend(CannedBackend::new()).await
    }

    /// Create a harness around a specific canned reply.
    pub async fn with_response(response: CompletionResponse) -> Self {
        Self::with_backend(CannedBackend::with_response(response)).await
    }

    async fn with_backend(backend: CannedBackend) -> Self {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(backend);
        let admin_key = "test-admin-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            admin_api_key: Some(admin_key.clone()),
            password_hash_cost: 4,
            gift_amount: 5000,
            request_timeout_seconds: 30,
            seed: Some(SeedAccount {
                email: "root@example.com".into(),
                password: "root-password".into(),
                name: "root".into(),
                invitation_code: Some(SEED_CODE.into()),
            }),
            ..ServiceConfig::default()
        };

        let state = AppState::with_backend(store.clone(), config, backend.clone());
        let root = ensure_seed_account(&state)
            .await
            .expect("Failed to seed")
            .expect("Seed account missing");

        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            backend,
            root,
            admin_key,
        }
    }

    /// Register a user under `invitation_code`.
    pub async fn register(&self, email: &str, invitation_code: &str) {
        self.server
            .post("/register")
            .json(&json!({
                "name": email.split('@').next().unwrap_or(email),
                "email": email,
                "password": "password",
                "invitation_code": invitation_code,
            }))
            .await
            .assert_status_ok();
    }

    /// Log in and return the bearer header value.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let token = body["data"]["token"].as_str().expect("token missing");
        format!("Bearer {token}")
    }

    /// Register under the seed account and log in.
    pub async fn signup(&self, email: &str) -> String {
        self.register(email, SEED_CODE).await;
        self.login(email, "password").await
    }

    /// Bearer header for the seed account.
    pub async fn root_auth(&self) -> String {
        self.login("root@example.com", "root-password").await
    }

    /// Look up a user by email.
    pub async fn user(&self, email: &str) -> User {
        self.store
            .get_user_by_email(email)
            .await
            .expect("store failed")
            .expect("user missing")
    }

    /// Insert an unredeemed code.
    pub async fn add_code(&self, code: &str, amount: i64) {
        self.store
            .put_redeem_code(&RedeemCode::with_code(code, amount))
            .await
            .expect("Failed to insert code");
    }
}

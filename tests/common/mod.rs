// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use maintrack_backend::app_data::AppData;
use maintrack_backend::config::{
    Argon2Settings, DatabaseConnections, MockEnvironment, SecretManager, Settings,
};
use maintrack_backend::coordinators::UserCoordinator;
use maintrack_backend::providers::ManualClock;
use maintrack_backend::types::internal::context::RequestContext;
use maintrack_backend::types::internal::user::User;
use poem::Endpoint;
use poem::http::StatusCode;
use poem::test::TestClient;
use serde_json::json;

/// 2024-01-01T00:00:00Z
pub const TEST_EPOCH: i64 = 1_704_067_200;

pub const DAY: i64 = 24 * 60 * 60;

pub fn test_environment() -> MockEnvironment {
    MockEnvironment::empty().with_vars(&[
        ("JWT_SECRET", "integration-secret-minimum-32-characters"),
        ("PASSWORD_PEPPER", "integration-pepper-value"),
        ("REFRESH_TOKEN_SECRET", "integration-refresh-secret-32-chars-min"),
    ])
}

/// AppData over migrated in-memory databases, driven by a manual clock
pub async fn setup_app_data() -> (Arc<AppData>, Arc<ManualClock>) {
    let connections = DatabaseConnections::connect("sqlite::memory:", "sqlite::memory:")
        .await
        .expect("Failed to create test databases");
    connections
        .migrate()
        .await
        .expect("Failed to run migrations");

    let env = test_environment();
    let settings = Settings::from_env_provider(&env)
        .expect("Default settings should load")
        .with_argon2(Argon2Settings {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        });
    let secret_manager = SecretManager::from_env_provider(&env).expect("Test secrets should be valid");
    let clock = Arc::new(ManualClock::new(TEST_EPOCH));

    let app_data = AppData::new(connections, settings, secret_manager, clock.clone());
    (Arc::new(app_data), clock)
}

/// Administrator created the way the `create-admin` command does it
pub async fn bootstrap_admin(app_data: &Arc<AppData>, email: &str) -> (User, String) {
    UserCoordinator::new(app_data.clone())
        .bootstrap_admin(&RequestContext::for_cli("create-admin"), "Root Admin", email)
        .await
        .expect("Failed to bootstrap admin")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Log in over HTTP and return (access_token, refresh_token)
pub async fn login<E: Endpoint>(client: &TestClient<E>, email: &str, password: &str) -> (String, String) {
    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "email": email, "password": password }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let json = resp.json().await;
    let body = json.value().object();
    (
        body.get("access_token").string().to_string(),
        body.get("refresh_token").string().to_string(),
    )
}

/// Create an approved user through `POST /api/users` and return its id
pub async fn create_user<E: Endpoint>(
    client: &TestClient<E>,
    admin_token: &str,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> String {
    let resp = client
        .post("/api/users")
        .header("Authorization", bearer(admin_token))
        .body_json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let json = resp.json().await;
    json.value().object().get("id").string().to_string()
}

/// Number of activity records for a user, read with an administrator token
pub async fn user_activity_count<E: Endpoint>(
    client: &TestClient<E>,
    admin_token: &str,
    user_id: &str,
) -> usize {
    let resp = client
        .get(format!("/api/users/{}/activity", user_id))
        .header("Authorization", bearer(admin_token))
        .send()
        .await;
    resp.assert_status_is_ok();

    let json = resp.json().await;
    json.value().array().len()
}

mod common;

use maintrack_backend::api::build_routes;
use poem::http::StatusCode;
use poem::test::TestClient;
use serde_json::json;

use common::{DAY, bearer, bootstrap_admin, login, setup_app_data};

#[tokio::test]
async fn test_health_needs_no_token() {
    let (app_data, _clock) = setup_app_data().await;
    let client = TestClient::new(build_routes(app_data));

    let resp = client.get("/api/health").send().await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("status").assert_string("healthy");
}

#[tokio::test]
async fn test_registered_account_cannot_log_in_until_approved() {
    let (app_data, _clock) = setup_app_data().await;
    let (_admin, admin_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));

    let resp = client
        .post("/api/auth/register")
        .body_json(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "password": "secret12",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("status").assert_string("pending");
    body.get("role").assert_string("GUEST");
    let grace_id = body.get("id").string().to_string();

    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "email": "grace@example.com", "password": "secret12" }))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    let (admin_token, _) = login(&client, "root@example.com", &admin_password).await;
    let resp = client
        .patch(format!("/api/users/{}/status", grace_id))
        .header("Authorization", bearer(&admin_token))
        .body_json(&json!({ "status": "approved" }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let (token, _) = login(&client, "grace@example.com", "secret12").await;
    let resp = client
        .get("/api/auth/whoami")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("user_id").assert_string(&grace_id);
    body.get("email").assert_string("grace@example.com");
    body.get("role").assert_string("GUEST");
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let (app_data, _clock) = setup_app_data().await;
    let client = TestClient::new(build_routes(app_data));
    let body = json!({
        "name": "Grace",
        "email": "grace@example.com",
        "password": "secret12",
    });

    client
        .post("/api/auth/register")
        .body_json(&body)
        .send()
        .await
        .assert_status(StatusCode::CREATED);
    client
        .post("/api/auth/register")
        .body_json(&body)
        .send()
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let (app_data, _clock) = setup_app_data().await;
    bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));

    let wrong_password = client
        .post("/api/auth/login")
        .body_json(&json!({ "email": "root@example.com", "password": "not-the-password" }))
        .send()
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    let wrong_password = wrong_password.json().await;

    let unknown_email = client
        .post("/api/auth/login")
        .body_json(&json!({ "email": "nobody@example.com", "password": "not-the-password" }))
        .send()
        .await;
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    let unknown_email = unknown_email.json().await;

    assert_eq!(
        wrong_password.value().object().get("message").string(),
        unknown_email.value().object().get("message").string()
    );
}

#[tokio::test]
async fn test_refresh_after_expiry_fails_without_minting_a_token() {
    let (app_data, clock) = setup_app_data().await;
    let (_admin, password) = bootstrap_admin(&app_data, "a@x.com").await;
    let client = TestClient::new(build_routes(app_data));

    let (_access, refresh) = login(&client, "a@x.com", &password).await;

    clock.advance(DAY);
    let resp = client
        .post("/api/auth/refresh")
        .body_json(&json!({ "refresh_token": refresh }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    assert!(!json.value().object().get("access_token").string().is_empty());

    clock.advance(7 * DAY);
    let resp = client
        .post("/api/auth/refresh")
        .body_json(&json!({ "refresh_token": refresh }))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let json = resp.json().await;
    json.value()
        .object()
        .get("error")
        .assert_string("expired_refresh_token");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token_and_is_idempotent() {
    let (app_data, _clock) = setup_app_data().await;
    let (_admin, password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (_access, refresh) = login(&client, "root@example.com", &password).await;

    for _ in 0..2 {
        client
            .post("/api/auth/logout")
            .body_json(&json!({ "refresh_token": refresh }))
            .send()
            .await
            .assert_status_is_ok();
    }

    client
        .post("/api/auth/refresh")
        .body_json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let (app_data, clock) = setup_app_data().await;
    let (_admin, password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (access, _refresh) = login(&client, "root@example.com", &password).await;

    clock.advance(15 * 60);

    client
        .get("/api/users")
        .header("Authorization", bearer(&access))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_bearer_is_rejected() {
    let (app_data, _clock) = setup_app_data().await;
    let client = TestClient::new(build_routes(app_data));

    client
        .get("/api/auth/whoami")
        .header("Authorization", bearer("not-a-jwt"))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

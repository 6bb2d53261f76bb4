mod common;

use maintrack_backend::api::build_routes;
use poem::http::StatusCode;
use poem::test::TestClient;
use serde_json::json;

use common::{bearer, bootstrap_admin, create_user, login, setup_app_data, user_activity_count};

#[tokio::test]
async fn test_admin_cannot_change_own_role_and_nothing_is_recorded() {
    let (app_data, _clock) = setup_app_data().await;
    let (_root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (root_token, _) = login(&client, "root@example.com", &root_password).await;
    create_user(&client, &root_token, "A", "a@x.com", "secret12", "ADMIN").await;

    let (token, _) = login(&client, "a@x.com", "secret12").await;
    let resp = client
        .get("/api/auth/whoami")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let claims = json.value().object();
    claims.get("email").assert_string("a@x.com");
    claims.get("role").assert_string("ADMIN");
    let sub = claims.get("user_id").string().to_string();

    let before = user_activity_count(&client, &root_token, &sub).await;

    let resp = client
        .patch(format!("/api/users/{}/role", sub))
        .header("Authorization", bearer(&token))
        .body_json(&json!({ "role": "MANAGER" }))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    let json = resp.json().await;
    json.value().object().get("error").assert_string("self_management");

    assert_eq!(user_activity_count(&client, &root_token, &sub).await, before);
}

#[tokio::test]
async fn test_every_self_management_operation_is_forbidden() {
    let (app_data, _clock) = setup_app_data().await;
    let (root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (token, _) = login(&client, "root@example.com", &root_password).await;

    let requests = vec![
        client
            .patch(format!("/api/users/{}/status", root.id))
            .body_json(&json!({ "status": "rejected" })),
        client
            .patch(format!("/api/users/{}/role", root.id))
            .body_json(&json!({ "role": "GUEST" })),
        client
            .patch(format!("/api/users/{}/active", root.id))
            .body_json(&json!({ "active": false })),
        client.delete(format!("/api/users/{}", root.id)),
    ];

    for request in requests {
        request
            .header("Authorization", bearer(&token))
            .send()
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    assert_eq!(user_activity_count(&client, &token, &root.id).await, 1);
}

#[tokio::test]
async fn test_status_change_records_before_and_after() {
    let (app_data, _clock) = setup_app_data().await;
    let (root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (token, _) = login(&client, "root@example.com", &root_password).await;
    let tech_id = create_user(&client, &token, "Tess", "tess@example.com", "secret12", "TECHNICIAN").await;

    let resp = client
        .patch(format!("/api/users/{}/status", tech_id))
        .header("Authorization", bearer(&token))
        .body_json(&json!({ "status": "rejected" }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("status").assert_string("rejected");

    let resp = client
        .get(format!("/api/users/{}/activity", tech_id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let entries = json.value().array();
    entries.assert_len(2);

    let created = entries.get(0).object();
    created.get("action").assert_string("CREATED");
    created.get("before_state").assert_null();

    let changed = entries.get(1).object();
    changed.get("action").assert_string("STATUS_CHANGED");
    changed.get("actor_user_id").assert_string(&root.id);
    changed.get("actor_name").assert_string("Root Admin");
    changed
        .get("before_state")
        .object()
        .get("status")
        .assert_string("approved");
    changed
        .get("after_state")
        .object()
        .get("status")
        .assert_string("rejected");
}

#[tokio::test]
async fn test_duplicate_email_leaves_user_list_unchanged() {
    let (app_data, _clock) = setup_app_data().await;
    let (_root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (token, _) = login(&client, "root@example.com", &root_password).await;
    create_user(&client, &token, "Tess", "tess@example.com", "secret12", "TECHNICIAN").await;

    let resp = client
        .post("/api/users")
        .header("Authorization", bearer(&token))
        .body_json(&json!({
            "name": "Other Tess",
            "email": "tess@example.com",
            "password": "secret12",
            "role": "CLIENT",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    let resp = client
        .get("/api/users")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().array().assert_len(2);
}

#[tokio::test]
async fn test_deleted_user_is_hidden_but_still_named_in_history() {
    let (app_data, _clock) = setup_app_data().await;
    let (_root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (root_token, _) = login(&client, "root@example.com", &root_password).await;
    let una_id = create_user(&client, &root_token, "Una", "una@example.com", "secret12", "ASSET_MANAGER").await;

    let (una_token, _) = login(&client, "una@example.com", "secret12").await;
    let resp = client
        .post("/api/assets")
        .header("Authorization", bearer(&una_token))
        .body_json(&json!({ "name": "Pump", "serial_number": "SN-1" }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    let asset_id = json.value().object().get("id").string().to_string();

    client
        .delete(format!("/api/users/{}", una_id))
        .header("Authorization", bearer(&root_token))
        .send()
        .await
        .assert_status_is_ok();

    let resp = client
        .get("/api/users")
        .header("Authorization", bearer(&root_token))
        .send()
        .await;
    let json = resp.json().await;
    json.value().array().assert_len(1);

    client
        .get(format!("/api/users/{}", una_id))
        .header("Authorization", bearer(&root_token))
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    client
        .post("/api/auth/login")
        .body_json(&json!({ "email": "una@example.com", "password": "secret12" }))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("/api/assets/{}/activity", asset_id))
        .header("Authorization", bearer(&root_token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let entries = json.value().array();
    entries.assert_len(1);
    let created = entries.get(0).object();
    created.get("actor_user_id").assert_string(&una_id);
    created.get("actor_name").assert_string("Una");

    assert_eq!(user_activity_count(&client, &root_token, &una_id).await, 2);
}

#[tokio::test]
async fn test_user_administration_requires_admin() {
    let (app_data, _clock) = setup_app_data().await;
    let (root, root_password) = bootstrap_admin(&app_data, "root@example.com").await;
    let client = TestClient::new(build_routes(app_data));
    let (root_token, _) = login(&client, "root@example.com", &root_password).await;
    create_user(&client, &root_token, "Mona", "mona@example.com", "secret12", "MANAGER").await;
    create_user(&client, &root_token, "Sam", "sam@example.com", "secret12", "SUPERVISOR").await;
    let (manager_token, _) = login(&client, "mona@example.com", "secret12").await;
    let (supervisor_token, _) = login(&client, "sam@example.com", "secret12").await;

    client
        .get("/api/users")
        .header("Authorization", bearer(&manager_token))
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .patch(format!("/api/users/{}/active", root.id))
        .header("Authorization", bearer(&manager_token))
        .body_json(&json!({ "active": false }))
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .get(format!("/api/users/{}", root.id))
        .header("Authorization", bearer(&supervisor_token))
        .send()
        .await
        .assert_status_is_ok();

    client
        .get("/api/users")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

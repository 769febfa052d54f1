use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sumi_server::auth::USER_SESSION_COOKIE;
use sumi_server::models::user;
use sumi_server::TestApp;

#[tokio::test]
async fn test_signup_success_sets_cookie() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "longenough1",
        "displayName": "Aoi",
        "mode": "signup",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert!(res.is_success());
    assert!(res.sets_cookie(USER_SESSION_COOKIE));

    let data = res.data();
    assert_eq!(data["user"]["email"], "a@b.com");
    assert_eq!(data["user"]["displayName"], "Aoi");
    assert!(data["expiresAt"].as_i64().unwrap() > Utc::now().timestamp_millis());
    // The password hash must never appear in a response.
    assert!(data["user"]["passwordHash"].is_null());
    assert!(data["user"]["password_hash"].is_null());
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "longenough1",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    let header = res.cookie_header(USER_SESSION_COOKIE).unwrap();
    assert!(header.contains("HttpOnly"), "missing HttpOnly: {}", header);
    assert!(
        header.contains("SameSite=Lax"),
        "missing SameSite=Lax: {}",
        header
    );
    assert!(header.contains("Path=/"), "missing Path=/: {}", header);
    assert!(header.contains("Expires="), "missing Expires: {}", header);
    // 30-day session lifetime, in seconds.
    assert!(
        header.contains("Max-Age=2592000"),
        "wrong Max-Age: {}",
        header
    );
    // Secure is reserved for production deployments (test runs over http).
    assert!(!header.contains("Secure"), "unexpected Secure: {}", header);
}

#[tokio::test]
async fn test_session_cookie_is_secure_in_production() {
    let mut config = TestApp::test_config();
    config.environment = "production".to_string();
    let app = TestApp::with_config(config).await;

    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "longenough1",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    let header = res.cookie_header(USER_SESSION_COOKIE).unwrap();
    assert!(header.contains("Secure"), "missing Secure: {}", header);
}

#[tokio::test]
async fn test_signup_then_login() {
    let app = TestApp::new().await;

    app.signup("a@b.com", "longenough1").await;

    // A fresh client, so the login cookie (not the signup one) is proven.
    let client = app.fresh_client();
    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "longenough1",
        "mode": "login",
    });
    let res = client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert!(res.sets_cookie(USER_SESSION_COOKIE));

    let res = client.get(&app.url("/api/auth/session")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["user"]["email"], "a@b.com");
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::new().await;

    app.signup("dup@b.com", "longenough1").await;

    let body = serde_json::json!({
        "email": "dup@b.com",
        "password": "another-password",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.error()["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_upgrades_passwordless_account() {
    let app = TestApp::new().await;

    // An account that predates choosing a password (e.g. created by sync).
    let now = Utc::now().naive_utc();
    user::ActiveModel {
        email: Set("legacy@b.com".to_string()),
        password_hash: Set(None),
        display_name: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();

    let body = serde_json::json!({
        "email": "legacy@b.com",
        "password": "longenough1",
        "displayName": "Legacy",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["user"]["displayName"], "Legacy");

    // And the password now works.
    app.login("legacy@b.com", "longenough1").await;
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;

    app.signup("a@b.com", "longenough1").await;

    let client = app.fresh_client();
    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "wrong-password",
        "mode": "login",
    });
    let res = client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert!(!res.sets_cookie(USER_SESSION_COOKIE));
}

#[tokio::test]
async fn test_login_unknown_email_indistinguishable_from_wrong_password() {
    let app = TestApp::new().await;

    app.signup("a@b.com", "longenough1").await;

    let client = app.fresh_client();
    let wrong_pw = client
        .post(
            &app.url("/api/auth/login"),
            &serde_json::json!({"email": "a@b.com", "password": "nope-nope", "mode": "login"})
                .to_string(),
        )
        .await;
    let unknown = client
        .post(
            &app.url("/api/auth/login"),
            &serde_json::json!({"email": "ghost@b.com", "password": "nope-nope", "mode": "login"})
                .to_string(),
        )
        .await;

    assert_eq!(wrong_pw.status, 401);
    assert_eq!(unknown.status, 401);
    assert_eq!(wrong_pw.error()["message"], unknown.error()["message"]);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post(&app.url("/api/auth/login"), "{not json")
        .await;
    assert_eq!(res.status, 400);

    // Unknown mode is also malformed input.
    let res = app
        .client
        .post(
            &app.url("/api/auth/login"),
            &serde_json::json!({"email": "a@b.com", "password": "x", "mode": "teleport"})
                .to_string(),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_invalid_fields_are_400_with_detail() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "short",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.error()["code"], "VALIDATION_ERROR");
    let fields = res.error()["fields"].as_array().unwrap().clone();
    assert_eq!(fields.len(), 2);
}

#[tokio::test]
async fn test_session_introspection() {
    let app = TestApp::new().await;

    // Unauthenticated: user is null, not a 401.
    let res = app.client.get(&app.url("/api/auth/session")).await;
    assert_eq!(res.status, 200);
    assert!(res.data()["user"].is_null());

    app.signup("a@b.com", "longenough1").await;

    let res = app.client.get(&app.url("/api/auth/session")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["user"]["email"], "a@b.com");
    assert!(res.data()["expiresAt"].as_i64().unwrap() > Utc::now().timestamp_millis());
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/auth/me")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error()["code"], "UNAUTHORIZED");

    app.signup("a@b.com", "longenough1").await;

    let res = app.client.get(&app.url("/api/auth/me")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["email"], "a@b.com");
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::new().await;

    app.signup("a@b.com", "longenough1").await;

    let res = app.client.post_empty(&app.url("/api/auth/logout")).await;
    assert_eq!(res.status, 200);

    let res = app.client.get(&app.url("/api/auth/session")).await;
    assert!(res.data()["user"].is_null());

    // Logging out without a session is still a 200.
    let res = app.client.post_empty(&app.url("/api/auth/logout")).await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_replaying_destroyed_session_id_is_unauthenticated() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "a@b.com",
        "password": "longenough1",
        "mode": "signup",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;
    let session_id = res.cookie_value(USER_SESSION_COOKIE).unwrap();

    app.client.post_empty(&app.url("/api/auth/logout")).await;

    // Replay the captured id from a client with no cookie store state.
    let res = app
        .fresh_client()
        .get_with_cookie(
            &app.url("/api/auth/session"),
            USER_SESSION_COOKIE,
            &session_id,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.data()["user"].is_null());
}

#[tokio::test]
async fn test_deleted_user_resolves_as_unauthenticated() {
    let app = TestApp::new().await;

    let user_json = app.signup("gone@b.com", "longenough1").await;
    let user_id = user_json["id"].as_i64().unwrap() as i32;

    user::Entity::delete_by_id(user_id)
        .exec(&app.db)
        .await
        .unwrap();

    let res = app.client.get(&app.url("/api/auth/session")).await;
    assert_eq!(res.status, 200);
    assert!(res.data()["user"].is_null());

    let res = app.client.get(&app.url("/api/auth/me")).await;
    assert_eq!(res.status, 401);
}

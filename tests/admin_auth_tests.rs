use chrono::Utc;
use sumi_server::auth::token::{SessionClaims, TokenCodec};
use sumi_server::auth::ADMIN_SESSION_COOKIE;
use sumi_server::TestApp;

#[tokio::test]
async fn test_admin_login_wrong_password() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "loginId": "admin",
        "password": "wrong",
    });
    let res = app
        .client
        .post(&app.url("/api/admin/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert!(!res.sets_cookie(ADMIN_SESSION_COOKIE));
}

#[tokio::test]
async fn test_admin_login_success() {
    let app = TestApp::new().await;

    let res = app.admin_login().await;
    assert_eq!(res.status, 200);
    assert!(res.sets_cookie(ADMIN_SESSION_COOKIE));
    assert_eq!(res.data()["user"]["loginId"], "admin");

    // Same cookie contract as the editor, with the shorter 7-day lifetime.
    let header = res.cookie_header(ADMIN_SESSION_COOKIE).unwrap();
    assert!(header.contains("HttpOnly"), "missing HttpOnly: {}", header);
    assert!(
        header.contains("SameSite=Lax"),
        "missing SameSite=Lax: {}",
        header
    );
    assert!(header.contains("Path=/"), "missing Path=/: {}", header);
    assert!(
        header.contains("Max-Age=604800"),
        "wrong Max-Age: {}",
        header
    );

    let res = app.client.get(&app.url("/api/admin/auth/session")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["user"]["loginId"], "admin");

    let res = app.client.get(&app.url("/api/admin/auth/me")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["loginId"], "admin");
}

#[tokio::test]
async fn test_admin_and_editor_sessions_do_not_cross() {
    let app = TestApp::new().await;

    app.admin_login().await;

    // An admin session grants nothing on the editor surface.
    let res = app.client.get(&app.url("/api/auth/me")).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_admin_guard_rejects_unauthenticated() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/admin/auth/me")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error()["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unconfigured_admin_credentials_is_500() {
    let mut config = TestApp::test_config();
    config.admin_login_id = None;
    config.admin_password = None;
    let app = TestApp::with_config(config).await;

    let body = serde_json::json!({
        "loginId": "admin",
        "password": "secret123",
    });
    let res = app
        .client
        .post(&app.url("/api/admin/auth/login"), &body.to_string())
        .await;

    // A deployment error, not a failed login.
    assert_eq!(res.status, 500);
    assert_eq!(res.error()["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_admin_logout_clears_cookie_but_token_outlives_it() {
    let app = TestApp::new().await;

    let res = app.admin_login().await;
    let token = res.cookie_value(ADMIN_SESSION_COOKIE).unwrap();

    let res = app
        .client
        .post_empty(&app.url("/api/admin/auth/logout"))
        .await;
    assert_eq!(res.status, 200);

    let res = app.client.get(&app.url("/api/admin/auth/session")).await;
    assert!(res.data()["user"].is_null());

    // Stateless tokens cannot be revoked: a copy captured before logout
    // stays valid until its natural expiry.
    let res = app
        .fresh_client()
        .get_with_cookie(
            &app.url("/api/admin/auth/session"),
            ADMIN_SESSION_COOKIE,
            &token,
        )
        .await;
    assert_eq!(res.data()["user"]["loginId"], "admin");
}

#[tokio::test]
async fn test_expired_admin_cookie_is_unauthenticated() {
    let app = TestApp::new().await;

    // Signed with the right secret, expired one millisecond ago.
    let codec = TokenCodec::new(&app.config.session_secret);
    let token = codec
        .encode(&SessionClaims {
            sub: "admin".to_string(),
            exp: Utc::now().timestamp_millis() - 1,
        })
        .unwrap();

    let res = app
        .client
        .get_with_cookie(
            &app.url("/api/admin/auth/session"),
            ADMIN_SESSION_COOKIE,
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.data()["user"].is_null());
}

#[tokio::test]
async fn test_forged_admin_cookie_is_unauthenticated() {
    let app = TestApp::new().await;

    let forged = TokenCodec::new("attacker-secret")
        .encode(&SessionClaims {
            sub: "admin".to_string(),
            exp: Utc::now().timestamp_millis() + 60_000,
        })
        .unwrap();

    let res = app
        .client
        .get_with_cookie(
            &app.url("/api/admin/auth/me"),
            ADMIN_SESSION_COOKIE,
            &forged,
        )
        .await;

    assert_eq!(res.status, 401);
}

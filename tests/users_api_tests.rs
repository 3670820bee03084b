//! Account endpoints through the full router

mod common;

use axum::http::StatusCode;
use common::{bearer, spawn_app, BASE_URL, PASSWORD, SECRET};
use contacts_api::auth::TokenService;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let app = spawn_app();

    let response = app.server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = spawn_app();

    let response = app.server.get("/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "code": "not_found", "message": "Not found" })
    );
}

#[tokio::test]
async fn test_register_creates_unverified_user() {
    let app = spawn_app();

    let response = app.register("Ann@Example.com").await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "ann@example.com");
    assert_eq!(body["user"]["subscription"], "starter");
    assert_eq!(body["user"]["verifiedEmail"], false);
    assert!(body["user"]["avatarURL"]
        .as_str()
        .unwrap()
        .starts_with("https://www.gravatar.com/avatar/"));
    assert!(body["user"].get("password").is_none());

    let letter = app.mailer.last_to("ann@example.com").unwrap();
    assert_eq!(letter.subject, "Verify email");
    assert!(letter.html.contains(&format!("{BASE_URL}/users/verify/")));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = spawn_app();
    app.register("ann@example.com").await.assert_status(StatusCode::CREATED);

    let duplicate = app.register("ANN@example.com").await;
    duplicate.assert_status(StatusCode::CONFLICT);
    assert_eq!(duplicate.json::<Value>()["message"], "Email in use");

    app.server
        .post("/users/register")
        .json(&json!({ "email": "not-an-email", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/users/register")
        .json(&json!({ "email": "bob@example.com", "password": "123" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/users/register")
        .json(&json!({ "email": "bob@example.com" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_requires_verified_email() {
    let app = spawn_app();
    app.register("ann@example.com").await;

    let response = app.login("ann@example.com").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Email is not verified");
}

#[tokio::test]
async fn test_login_with_wrong_credentials() {
    let app = spawn_app();
    app.signed_in("ann@example.com").await;

    let wrong_password = app
        .server
        .post("/users/login")
        .json(&json!({ "email": "ann@example.com", "password": "wrong-password" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        "Email or password is wrong"
    );

    let unknown = app.login("nobody@example.com").await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json::<Value>()["message"], "Email or password is wrong");
}

#[tokio::test]
async fn test_verification_token_is_single_use() {
    let app = spawn_app();
    app.register("ann@example.com").await;
    let token = app.verify_token_for("ann@example.com");

    let first = app.server.get(&format!("/users/verify/{token}")).await;
    first.assert_status_ok();
    assert_eq!(
        first.json::<Value>(),
        json!({ "message": "Verification successful" })
    );

    app.server
        .get(&format!("/users/verify/{token}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/users/verify/unknown-token")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resend_verification() {
    let app = spawn_app();
    app.register("ann@example.com").await;
    let original = app.verify_token_for("ann@example.com");

    let response = app
        .server
        .post("/users/verify")
        .json(&json!({ "email": "ann@example.com" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "Verification email sent" })
    );
    assert_eq!(app.mailer.sent().len(), 2);
    assert_eq!(app.verify_token_for("ann@example.com"), original);

    app.server
        .post("/users/verify")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/users/verify")
        .json(&json!({ "email": "nobody@example.com" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .get(&format!("/users/verify/{original}"))
        .await
        .assert_status_ok();

    let verified = app
        .server
        .post("/users/verify")
        .json(&json!({ "email": "ann@example.com" }))
        .await;
    verified.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        verified.json::<Value>()["message"],
        "Verification has already been passed"
    );
}

#[tokio::test]
async fn test_login_current_logout() {
    let app = spawn_app();
    let token = app.signed_in("ann@example.com").await;

    let current = app
        .server
        .get("/users/current")
        .add_header("Authorization", bearer(&token))
        .await;
    current.assert_status_ok();
    assert_eq!(
        current.json::<Value>(),
        json!({ "email": "ann@example.com", "subscription": "starter" })
    );

    app.server
        .post("/users/logout")
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let after = app
        .server
        .get("/users/current")
        .add_header("Authorization", bearer(&token))
        .await;
    after.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(after.json::<Value>()["message"], "Not authorized");
}

#[tokio::test]
async fn test_authorization_header_failures() {
    let app = spawn_app();

    let missing = app.server.get("/users/current").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>()["message"], "Token type is not valid");

    let wrong_scheme = app
        .server
        .get("/users/current")
        .add_header("Authorization", "Basic abc")
        .await;
    assert_eq!(
        wrong_scheme.json::<Value>()["message"],
        "Token type is not valid"
    );

    let no_token = app
        .server
        .get("/users/current")
        .add_header("Authorization", "Bearer")
        .await;
    no_token.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(no_token.json::<Value>()["message"], "No token provided");

    let garbage = app
        .server
        .get("/users/current")
        .add_header("Authorization", "Bearer not.a.jwt")
        .await;
    garbage.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.json::<Value>()["message"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = spawn_app();
    let tokens = TokenService::new(SECRET.to_string(), 3600).unwrap();
    let two_hours_ago = chrono::Utc::now().timestamp() - 7200;
    let stale = tokens.issue_at("someone", two_hours_ago).unwrap();

    let response = app
        .server
        .get("/users/current")
        .add_header("Authorization", bearer(&stale))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({ "code": "unauthorized", "message": "Token expired" })
    );
}

#[tokio::test]
async fn test_oversized_bodies_get_json_413() {
    let app = spawn_app();

    for size in [2 * 1024 * 1024, 6 * 1024 * 1024] {
        let response = app
            .server
            .post("/users/login")
            .content_type("application/json")
            .bytes(vec![b'a'; size].into())
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.json::<Value>()["code"], "payload_too_large");
    }
}

#[tokio::test]
async fn test_update_subscription() {
    let app = spawn_app();
    let token = app.signed_in("ann@example.com").await;

    let response = app
        .server
        .patch("/users")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "subscription": "pro" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["subscription"], "pro");

    app.server
        .patch("/users")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "subscription": "platinum" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let current: Value = app
        .server
        .get("/users/current")
        .add_header("Authorization", bearer(&token))
        .await
        .json();
    assert_eq!(current["subscription"], "pro");
}

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use hrms::AppError;
use hrms::database::models::{LoginInput, Role};

#[macro_use]
mod common;

use common::{TEST_PASSWORD, TestContext, bearer};

#[tokio::test]
async fn test_login_with_matching_role_returns_token() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Hr).await.unwrap();

    let response = ctx
        .state
        .auth_service
        .login(LoginInput {
            email: user.email.clone(),
            password: TEST_PASSWORD.to_string(),
            role: Role::Hr,
        })
        .await
        .unwrap();

    assert!(!response.token.is_empty());
    assert_eq!(response.user.id, user.id);

    let claims = ctx.state.auth_service.verify_token(&response.token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Hr);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();

    let attempts = [
        (user.email.clone(), TEST_PASSWORD, Role::Manager),
        (user.email.clone(), "wrong-password", Role::Employee),
        ("nobody@example.com".to_string(), TEST_PASSWORD, Role::Employee),
    ];

    let mut messages = Vec::new();
    for (email, password, role) in attempts {
        let err = ctx
            .state
            .auth_service
            .login(LoginInput {
                email,
                password: password.to_string(),
                role,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        messages.push(err.to_string());
    }

    assert!(messages.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();

    let result = ctx
        .state
        .auth_service
        .login(LoginInput {
            email: user.email.to_uppercase(),
            password: TEST_PASSWORD.to_string(),
            role: Role::Employee,
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();
    let auth = &ctx.state.auth_service;

    let wrong = auth
        .change_password(user.id, "not-my-password", "new-password-1")
        .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    let short = auth.change_password(user.id, TEST_PASSWORD, "short").await;
    assert!(matches!(short, Err(AppError::BadRequest(_))));

    auth.change_password(user.id, TEST_PASSWORD, "new-password-1")
        .await
        .unwrap();

    let login = auth
        .login(LoginInput {
            email: user.email.clone(),
            password: "new-password-1".to_string(),
            role: Role::Employee,
        })
        .await;
    assert!(login.is_ok());
}

#[actix_web::test]
async fn test_login_endpoint_wraps_response() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Manager).await.unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({
            "email": user.email,
            "password": TEST_PASSWORD,
            "role": "MANAGER"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["data"]["user"]["role"], "MANAGER");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["token"].as_str().is_some());
}

#[actix_web::test]
async fn test_login_endpoint_rejects_wrong_role() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({
            "email": user.email,
            "password": TEST_PASSWORD,
            "role": "ADMIN"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BadRequest");
}

#[actix_web::test]
async fn test_me_requires_token() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.create_user(Role::Employee).await.unwrap();
    let token = ctx.token_for(&user);
    let app = init_app!(ctx);

    let anonymous = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");

    let forged = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer("not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, forged).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], user.email);
}

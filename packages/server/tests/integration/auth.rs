use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_can_log_in_with_email() {
        let app = TestApp::spawn().await;
        app.register_user("vasya").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "vasya@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["auth_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.register_user("vasya").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "vasya@example.com", "password": "not-my-password"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_email_is_rejected_the_same_way() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ghost@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"email": "vasya@example.com"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn bearer_scheme_is_accepted_too() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("vasya").await;

        let res = app
            .client
            .get(app.url(routes::ME))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn protected_endpoint_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_even_on_public_endpoints() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::RECIPES, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn logout_requires_a_token_and_returns_no_content() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("vasya").await;

        let anonymous = app.post_without_token(routes::LOGOUT, &json!({})).await;
        assert_eq!(anonymous.status, 401);

        let res = app.post_with_token(routes::LOGOUT, &json!({}), &token).await;
        assert_eq!(res.status, 204);
    }
}

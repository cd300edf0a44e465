use serde_json::json;

use crate::common::{TestApp, routes};

mod subscribe {
    use super::*;

    #[tokio::test]
    async fn subscribing_returns_the_author_card() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let (author_token, author) = app.create_authenticated_user("author").await;
        let tag = app.create_tag("Обед", "lunch").await;
        let salt = app.create_ingredient("соль", "г").await;
        app.create_recipe(&author_token, "Борщ", &[tag], &[(salt, 5)]).await;

        let res = app
            .post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], author);
        assert_eq!(res.body["is_subscribed"], true);
        assert_eq!(res.body["recipes_count"], 1);
        assert_eq!(res.body["recipes"][0]["name"], "Борщ");
        assert!(res.body["recipes"][0].get("text").is_none());
    }

    #[tokio::test]
    async fn subscribing_twice_is_rejected() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let author = app.register_user("author").await;

        let first = app
            .post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;
        assert_eq!(second.status, 400);
        assert_eq!(second.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn subscribing_to_yourself_is_rejected() {
        let app = TestApp::spawn().await;
        let (token, id) = app.create_authenticated_user("narcissus").await;

        let res = app
            .post_with_token(&routes::subscribe(id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "SELF_SUBSCRIPTION");

        let res = app.delete_with_token(&routes::subscribe(id), &token).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "SELF_SUBSCRIPTION");
    }

    #[tokio::test]
    async fn subscribing_to_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("reader").await;

        let res = app
            .post_with_token(&routes::subscribe(9999), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_subscribe() {
        let app = TestApp::spawn().await;
        let author = app.register_user("author").await;

        let res = app
            .post_without_token(&routes::subscribe(author), &json!({}))
            .await;

        assert_eq!(res.status, 401);
    }
}

mod unsubscribe {
    use super::*;

    #[tokio::test]
    async fn unsubscribing_removes_the_author_from_the_list() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let author = app.register_user("author").await;
        app.post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;

        let res = app.delete_with_token(&routes::subscribe(author), &reader).await;
        assert_eq!(res.status, 204);

        let list = app.get_with_token(routes::SUBSCRIPTIONS, &reader).await;
        assert_eq!(list.body["count"], 0);
    }

    #[tokio::test]
    async fn unsubscribing_when_not_subscribed_is_rejected() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let author = app.register_user("author").await;

        let res = app.delete_with_token(&routes::subscribe(author), &reader).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn recipes_limit_caps_previews_but_not_the_count() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let (author_token, author) = app.create_authenticated_user("author").await;
        let tag = app.create_tag("Ужин", "dinner").await;
        let salt = app.create_ingredient("соль", "г").await;
        for name in ["Первый", "Второй", "Третий"] {
            app.create_recipe(&author_token, name, &[tag], &[(salt, 1)]).await;
        }
        app.post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;

        let res = app
            .get_with_token(&format!("{}?recipes_limit=2", routes::SUBSCRIPTIONS), &reader)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 1);
        let card = &res.body["results"][0];
        assert_eq!(card["id"], author);
        assert_eq!(card["recipes"].as_array().unwrap().len(), 2);
        assert_eq!(card["recipes_count"], 3);
    }

    #[tokio::test]
    async fn invalid_recipes_limit_is_ignored() {
        let app = TestApp::spawn().await;
        let (reader, _) = app.create_authenticated_user("reader").await;
        let (author_token, author) = app.create_authenticated_user("author").await;
        let tag = app.create_tag("Ужин", "dinner").await;
        let salt = app.create_ingredient("соль", "г").await;
        for name in ["Первый", "Второй"] {
            app.create_recipe(&author_token, name, &[tag], &[(salt, 1)]).await;
        }
        app.post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;

        let res = app
            .get_with_token(&format!("{}?recipes_limit=abc", routes::SUBSCRIPTIONS), &reader)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["results"][0]["recipes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn subscriptions_require_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::SUBSCRIPTIONS).await;

        assert_eq!(res.status, 401);
    }
}

use serde_json::json;

use crate::common::{TestApp, routes};

/// Spawn an app with one published recipe and a second logged-in user.
async fn setup() -> (TestApp, i32, String) {
    let app = TestApp::spawn().await;
    let (author, _) = app.create_authenticated_user("author").await;
    let tag = app.create_tag("Обед", "lunch").await;
    let salt = app.create_ingredient("соль", "г").await;
    let recipe = app.create_recipe(&author, "Суп", &[tag], &[(salt, 5)]).await;
    let (fan, _) = app.create_authenticated_user("fan").await;
    (app, recipe, fan)
}

mod favorites {
    use super::*;

    #[tokio::test]
    async fn favoriting_returns_the_minified_recipe() {
        let (app, recipe, fan) = setup().await;

        let res = app
            .post_with_token(&routes::favorite(recipe), &json!({}), &fan)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], recipe);
        assert_eq!(res.body["name"], "Суп");
        assert_eq!(res.body["cooking_time"], 15);
        assert!(res.body.get("ingredients").is_none());

        let detail = app.get_with_token(&routes::recipe(recipe), &fan).await;
        assert_eq!(detail.body["is_favorited"], true);
        assert_eq!(detail.body["is_in_shopping_cart"], false);
    }

    #[tokio::test]
    async fn second_favorite_is_rejected() {
        let (app, recipe, fan) = setup().await;
        app.post_with_token(&routes::favorite(recipe), &json!({}), &fan)
            .await;

        let res = app
            .post_with_token(&routes::favorite(recipe), &json!({}), &fan)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn removing_a_missing_favorite_is_rejected() {
        let (app, recipe, fan) = setup().await;

        let res = app.delete_with_token(&routes::favorite(recipe), &fan).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn favorite_round_trip_updates_the_filter() {
        let (app, recipe, fan) = setup().await;
        app.post_with_token(&routes::favorite(recipe), &json!({}), &fan)
            .await;

        let listed = app
            .get_with_token(&format!("{}?is_favorited=1", routes::RECIPES), &fan)
            .await;
        assert_eq!(listed.body["count"], 1);

        let removed = app.delete_with_token(&routes::favorite(recipe), &fan).await;
        assert_eq!(removed.status, 204);

        let listed = app
            .get_with_token(&format!("{}?is_favorited=1", routes::RECIPES), &fan)
            .await;
        assert_eq!(listed.body["count"], 0);
    }

    #[tokio::test]
    async fn favoriting_unknown_recipe_is_not_found() {
        let (app, _, fan) = setup().await;

        let res = app
            .post_with_token(&routes::favorite(9999), &json!({}), &fan)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod shopping_cart {
    use super::*;

    #[tokio::test]
    async fn cart_toggle_mirrors_favorites() {
        let (app, recipe, fan) = setup().await;

        let added = app
            .post_with_token(&routes::shopping_cart(recipe), &json!({}), &fan)
            .await;
        assert_eq!(added.status, 201, "{}", added.text);

        let again = app
            .post_with_token(&routes::shopping_cart(recipe), &json!({}), &fan)
            .await;
        assert_eq!(again.status, 400);

        let listed = app
            .get_with_token(&format!("{}?is_in_shopping_cart=true", routes::RECIPES), &fan)
            .await;
        assert_eq!(listed.body["count"], 1);
        assert_eq!(listed.body["results"][0]["is_in_shopping_cart"], true);

        let removed = app
            .delete_with_token(&routes::shopping_cart(recipe), &fan)
            .await;
        assert_eq!(removed.status, 204);

        let removed_again = app
            .delete_with_token(&routes::shopping_cart(recipe), &fan)
            .await;
        assert_eq!(removed_again.status, 400);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_use_the_cart() {
        let (app, recipe, _) = setup().await;

        let res = app
            .post_without_token(&routes::shopping_cart(recipe), &json!({}))
            .await;

        assert_eq!(res.status, 401);
    }
}

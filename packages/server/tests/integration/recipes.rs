use serde_json::json;

use crate::common::{GIF_DATA_URI, TestApp, recipe_body, routes};

/// A logged-in author with one tag and two ingredients to cook with.
struct Kitchen {
    app: TestApp,
    token: String,
    author: i32,
    lunch: i32,
    flour: i32,
    salt: i32,
}

impl Kitchen {
    async fn open() -> Self {
        let app = TestApp::spawn().await;
        let (token, author) = app.create_authenticated_user("chef").await;
        let lunch = app.create_tag("Обед", "lunch").await;
        let flour = app.create_ingredient("мука", "г").await;
        let salt = app.create_ingredient("соль", "г").await;
        Self {
            app,
            token,
            author,
            lunch,
            flour,
            salt,
        }
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn author_can_publish_a_recipe() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Блины", &[k.lunch], &[(k.flour, 200), (k.salt, 5)]),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Блины");
        assert_eq!(res.body["cooking_time"], 15);
        assert_eq!(res.body["author"]["id"], k.author);
        assert_eq!(res.body["tags"][0]["slug"], "lunch");
        assert_eq!(res.body["ingredients"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["is_favorited"], false);
        assert_eq!(res.body["is_in_shopping_cart"], false);
        assert!(res.body["image"].as_str().unwrap().starts_with("/media/"));

        let flour_line = res.body["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["id"] == k.flour)
            .expect("flour line");
        assert_eq!(flour_line["amount"], 200);
        assert_eq!(flour_line["measurement_unit"], "г");
    }

    #[tokio::test]
    async fn duplicate_ingredients_are_rejected() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Блины", &[k.lunch], &[(k.flour, 200), (k.flour, 100)]),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "ingredients");
    }

    #[tokio::test]
    async fn recipe_without_tags_is_rejected() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Блины", &[], &[(k.flour, 200)]),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "tags");
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Блины", &[k.lunch], &[(k.flour, 0)]),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "amount");
    }

    #[tokio::test]
    async fn cooking_time_out_of_range_is_rejected() {
        let k = Kitchen::open().await;
        let mut body = recipe_body("Блины", &[k.lunch], &[(k.flour, 200)]);
        body["cooking_time"] = json!(0);

        let res = k.app.post_with_token(routes::RECIPES, &body, &k.token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "cooking_time");
    }

    #[tokio::test]
    async fn unknown_ingredient_is_rejected() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Блины", &[k.lunch], &[(9999, 1)]),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn malformed_image_is_rejected() {
        let k = Kitchen::open().await;
        let mut body = recipe_body("Блины", &[k.lunch], &[(k.flour, 200)]);
        body["image"] = json!("data:image/png;base64,not base64!");

        let res = k.app.post_with_token(routes::RECIPES, &body, &k.token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "image");
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_publish() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .post_without_token(
                routes::RECIPES,
                &recipe_body("Блины", &[k.lunch], &[(k.flour, 200)]),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn author_can_replace_ingredients_and_keep_the_image() {
        let k = Kitchen::open().await;
        let id = k
            .app
            .create_recipe(&k.token, "Блины", &[k.lunch], &[(k.flour, 200)])
            .await;
        let before = k.app.get_without_token(&routes::recipe(id)).await;

        let res = k
            .app
            .patch_with_token(
                &routes::recipe(id),
                &json!({
                    "ingredients": [{"id": k.salt, "amount": 3}],
                    "tags": [k.lunch],
                    "name": "Солёные блины",
                }),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Солёные блины");
        assert_eq!(res.body["text"], "Смешать и подавать.");
        assert_eq!(res.body["image"], before.body["image"]);
        let ingredients = res.body["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0]["id"], k.salt);
    }

    #[tokio::test]
    async fn new_image_replaces_the_old_one() {
        let k = Kitchen::open().await;
        let id = k
            .app
            .create_recipe(&k.token, "Блины", &[k.lunch], &[(k.flour, 200)])
            .await;

        let res = k
            .app
            .patch_with_token(
                &routes::recipe(id),
                &json!({
                    "ingredients": [{"id": k.flour, "amount": 200}],
                    "tags": [k.lunch],
                    "image": GIF_DATA_URI,
                }),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["image"].as_str().unwrap().ends_with(".gif"));
    }

    #[tokio::test]
    async fn update_without_tags_is_rejected() {
        let k = Kitchen::open().await;
        let id = k
            .app
            .create_recipe(&k.token, "Блины", &[k.lunch], &[(k.flour, 200)])
            .await;

        let res = k
            .app
            .patch_with_token(
                &routes::recipe(id),
                &json!({"ingredients": [{"id": k.flour, "amount": 1}], "name": "X"}),
                &k.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["field"], "tags");
    }

    #[tokio::test]
    async fn other_users_cannot_edit_or_delete() {
        let k = Kitchen::open().await;
        let id = k
            .app
            .create_recipe(&k.token, "Блины", &[k.lunch], &[(k.flour, 200)])
            .await;
        let (stranger, _) = k.app.create_authenticated_user("stranger").await;

        let patch = k
            .app
            .patch_with_token(
                &routes::recipe(id),
                &json!({"ingredients": [{"id": k.flour, "amount": 1}], "tags": [k.lunch]}),
                &stranger,
            )
            .await;
        assert_eq!(patch.status, 403);
        assert_eq!(patch.body["code"], "PERMISSION_DENIED");

        let delete = k.app.delete_with_token(&routes::recipe(id), &stranger).await;
        assert_eq!(delete.status, 403);

        let still_there = k.app.get_without_token(&routes::recipe(id)).await;
        assert_eq!(still_there.status, 200);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn author_can_delete_a_favorited_recipe() {
        let k = Kitchen::open().await;
        let id = k
            .app
            .create_recipe(&k.token, "Блины", &[k.lunch], &[(k.flour, 200)])
            .await;
        let (fan, _) = k.app.create_authenticated_user("fan").await;
        k.app
            .post_with_token(&routes::favorite(id), &json!({}), &fan)
            .await;
        k.app
            .post_with_token(&routes::shopping_cart(id), &json!({}), &fan)
            .await;

        let res = k.app.delete_with_token(&routes::recipe(id), &k.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let gone = k.app.get_without_token(&routes::recipe(id)).await;
        assert_eq!(gone.status, 404);

        let favorites = k
            .app
            .get_with_token(&format!("{}?is_favorited=1", routes::RECIPES), &fan)
            .await;
        assert_eq!(favorites.body["count"], 0);
    }

    #[tokio::test]
    async fn deleting_unknown_recipe_is_not_found() {
        let k = Kitchen::open().await;

        let res = k.app.delete_with_token(&routes::recipe(9999), &k.token).await;

        assert_eq!(res.status, 404);
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn recipes_are_paginated_in_publication_order() {
        let k = Kitchen::open().await;
        for name in ["Первый", "Второй", "Третий"] {
            k.app
                .create_recipe(&k.token, name, &[k.lunch], &[(k.flour, 100)])
                .await;
        }

        let res = k
            .app
            .get_without_token(&format!("{}?limit=2", routes::RECIPES))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 3);
        let names: Vec<&str> = res.body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Первый", "Второй"]);
        assert_eq!(res.body["next"], "/api/recipes?limit=2&page=2");

        let beyond = k
            .app
            .get_without_token(&format!("{}?limit=2&page=5", routes::RECIPES))
            .await;
        assert_eq!(beyond.status, 200);
        assert!(beyond.body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn maximal_page_number_returns_an_empty_page() {
        let k = Kitchen::open().await;
        k.app
            .create_recipe(&k.token, "Суп", &[k.lunch], &[(k.salt, 1)])
            .await;

        let res = k
            .app
            .get_without_token(&format!("{}?page={}", routes::RECIPES, u64::MAX))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 1);
        assert!(res.body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tag_filter_matches_any_of_the_given_slugs() {
        let k = Kitchen::open().await;
        let dinner = k.app.create_tag("Ужин", "dinner").await;
        let breakfast = k.app.create_tag("Завтрак", "breakfast").await;
        k.app
            .create_recipe(&k.token, "Суп", &[k.lunch], &[(k.salt, 1)])
            .await;
        k.app
            .create_recipe(&k.token, "Рагу", &[dinner], &[(k.salt, 1)])
            .await;
        k.app
            .create_recipe(&k.token, "Каша", &[breakfast], &[(k.salt, 1)])
            .await;

        let res = k
            .app
            .get_without_token(&format!("{}?tags=lunch&tags=dinner", routes::RECIPES))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 2);
    }

    #[tokio::test]
    async fn recipe_with_several_matching_tags_is_listed_once() {
        let k = Kitchen::open().await;
        let dinner = k.app.create_tag("Ужин", "dinner").await;
        k.app
            .create_recipe(&k.token, "Суп", &[k.lunch, dinner], &[(k.salt, 1)])
            .await;

        let res = k
            .app
            .get_without_token(&format!("{}?tags=lunch&tags=dinner", routes::RECIPES))
            .await;

        assert_eq!(res.body["count"], 1);
        assert_eq!(res.body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn author_filter_limits_to_one_author() {
        let k = Kitchen::open().await;
        let (other, _) = k.app.create_authenticated_user("other").await;
        k.app
            .create_recipe(&k.token, "Суп", &[k.lunch], &[(k.salt, 1)])
            .await;
        k.app
            .create_recipe(&other, "Рагу", &[k.lunch], &[(k.salt, 1)])
            .await;

        let res = k
            .app
            .get_without_token(&format!("{}?author={}", routes::RECIPES, k.author))
            .await;

        assert_eq!(res.body["count"], 1);
        assert_eq!(res.body["results"][0]["name"], "Суп");
    }

    #[tokio::test]
    async fn relation_filters_are_empty_for_anonymous_callers() {
        let k = Kitchen::open().await;
        k.app
            .create_recipe(&k.token, "Суп", &[k.lunch], &[(k.salt, 1)])
            .await;

        let res = k
            .app
            .get_without_token(&format!("{}?is_in_shopping_cart=1", routes::RECIPES))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["count"], 0);
    }

    #[tokio::test]
    async fn malformed_author_filter_is_a_validation_error() {
        let k = Kitchen::open().await;

        let res = k
            .app
            .get_without_token(&format!("{}?author=abc", routes::RECIPES))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

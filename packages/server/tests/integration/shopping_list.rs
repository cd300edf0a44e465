use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn amounts_are_summed_across_recipes_in_the_cart() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("cook").await;
    let tag = app.create_tag("Обед", "lunch").await;
    let salt = app.create_ingredient("соль", "г").await;
    let flour = app.create_ingredient("мука", "г").await;
    let soup = app.create_recipe(&token, "Суп", &[tag], &[(salt, 5)]).await;
    let bread = app
        .create_recipe(&token, "Хлеб", &[tag], &[(salt, 3), (flour, 500)])
        .await;
    for id in [soup, bread] {
        let res = app
            .post_with_token(&routes::shopping_cart(id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get_with_token(routes::DOWNLOAD_SHOPPING_CART, &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.header("content-type").unwrap().starts_with("text/plain"));
    assert!(res.header("content-disposition").unwrap().starts_with("attachment"));
    assert!(res.text.contains("соль (г): 8"), "{}", res.text);
    assert!(res.text.contains("мука (г): 500"), "{}", res.text);
    assert!(res.text.find("мука").unwrap() < res.text.find("соль").unwrap());
}

#[tokio::test]
async fn same_name_in_different_units_stays_separate() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("cook").await;
    let tag = app.create_tag("Обед", "lunch").await;
    let grams = app.create_ingredient("сахар", "г").await;
    let spoons = app.create_ingredient("сахар", "ст. л.").await;
    let id = app
        .create_recipe(&token, "Компот", &[tag], &[(grams, 100), (spoons, 2)])
        .await;
    app.post_with_token(&routes::shopping_cart(id), &json!({}), &token)
        .await;

    let res = app.get_with_token(routes::DOWNLOAD_SHOPPING_CART, &token).await;

    assert!(res.text.contains("сахар (г): 100"), "{}", res.text);
    assert!(res.text.contains("сахар (ст. л.): 2"), "{}", res.text);
}

#[tokio::test]
async fn empty_cart_cannot_be_downloaded() {
    let app = TestApp::spawn().await;
    let (token, _) = app.create_authenticated_user("cook").await;

    let res = app.get_with_token(routes::DOWNLOAD_SHOPPING_CART, &token).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "EMPTY_CART");
}

#[tokio::test]
async fn only_the_callers_cart_is_counted() {
    let app = TestApp::spawn().await;
    let (cook, _) = app.create_authenticated_user("cook").await;
    let (guest, _) = app.create_authenticated_user("guest").await;
    let tag = app.create_tag("Обед", "lunch").await;
    let salt = app.create_ingredient("соль", "г").await;
    let id = app.create_recipe(&cook, "Суп", &[tag], &[(salt, 5)]).await;
    app.post_with_token(&routes::shopping_cart(id), &json!({}), &guest)
        .await;

    let res = app.get_with_token(routes::DOWNLOAD_SHOPPING_CART, &cook).await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn download_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::DOWNLOAD_SHOPPING_CART).await;

    assert_eq!(res.status, 401);
}

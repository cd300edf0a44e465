use std::time::Duration;

use common::MediaKey;
use common::media::decode_data_uri;
use foodgram::entity::user;
use foodgram::error::AppError;
use foodgram::utils::media::{attach_image, finish_with_image, release_image};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

use crate::common::{GIF_DATA_URI, PNG_DATA_URI, TestApp, routes};

mod release {
    use super::*;

    #[tokio::test]
    async fn release_waits_for_a_pending_reference() {
        let app = TestApp::spawn().await;
        let user_id = app.register_user("vasya").await;
        let image = decode_data_uri(GIF_DATA_URI).unwrap();

        let txn = app.db.begin().await.unwrap();
        let key = attach_image(&txn, app.media.as_ref(), &image).await.unwrap();

        let releaser = {
            let db = app.db.clone();
            let media = app.media.clone();
            let key = key.clone();
            tokio::spawn(async move { release_image(&db, media.as_ref(), &key).await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!releaser.is_finished(), "release must wait for the key lock");

        user::ActiveModel {
            id: Set(user_id),
            avatar: Set(Some(key.clone())),
            ..Default::default()
        }
        .update(&txn)
        .await
        .unwrap();
        txn.commit().await.unwrap();

        releaser.await.unwrap().unwrap();
        let parsed: MediaKey = key.parse().unwrap();
        assert!(app.media.exists(&parsed).await.unwrap());
    }

    #[tokio::test]
    async fn attaching_rewrites_a_file_deleted_just_before() {
        let app = TestApp::spawn().await;
        let image = decode_data_uri(PNG_DATA_URI).unwrap();
        let key = app.media.put(&image).await.unwrap();
        app.media.delete(&key).await.unwrap();

        let txn = app.db.begin().await.unwrap();
        let attached = attach_image(&txn, app.media.as_ref(), &image).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(attached, key.to_string());
        assert!(app.media.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn failed_transaction_releases_its_image() {
        let app = TestApp::spawn().await;
        let image = decode_data_uri(GIF_DATA_URI).unwrap();

        let txn = app.db.begin().await.unwrap();
        let key = attach_image(&txn, app.media.as_ref(), &image).await.unwrap();
        let result = finish_with_image::<()>(
            txn,
            Err(AppError::Internal("write failed".into())),
            &app.db,
            app.media.as_ref(),
            Some(key.as_str()),
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        let parsed: MediaKey = key.parse().unwrap();
        assert!(!app.media.exists(&parsed).await.unwrap());
    }
}

mod shared_images {
    use super::*;

    #[tokio::test]
    async fn deleting_one_recipe_keeps_an_image_another_still_uses() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("chef").await;
        let tag = app.create_tag("Обед", "lunch").await;
        let salt = app.create_ingredient("соль", "г").await;
        let first = app.create_recipe(&token, "Суп", &[tag], &[(salt, 1)]).await;
        let second = app.create_recipe(&token, "Рагу", &[tag], &[(salt, 1)]).await;

        let image_url = app.get_without_token(&routes::recipe(second)).await.body["image"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app.delete_with_token(&routes::recipe(first), &token).await;
        assert_eq!(res.status, 204);

        let file = app.get_without_token(&image_url).await;
        assert_eq!(file.status, 200);
    }

    #[tokio::test]
    async fn deleting_the_last_reference_removes_the_file() {
        let app = TestApp::spawn().await;
        let (token, _) = app.create_authenticated_user("chef").await;
        let tag = app.create_tag("Обед", "lunch").await;
        let salt = app.create_ingredient("соль", "г").await;
        let id = app.create_recipe(&token, "Суп", &[tag], &[(salt, 1)]).await;
        let image_url = app.get_without_token(&routes::recipe(id)).await.body["image"]
            .as_str()
            .unwrap()
            .to_string();

        app.delete_with_token(&routes::recipe(id), &token).await;

        let file = app.get_without_token(&image_url).await;
        assert_eq!(file.status, 404);
    }
}

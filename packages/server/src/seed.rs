use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use serde::Deserialize;
use tracing::info;

use crate::entity::{favorite, ingredient, recipe, shopping_cart, subscription, tag};

/// One entry of an ingredient fixture file.
#[derive(Debug, Deserialize)]
pub struct IngredientFixture {
    pub name: String,
    pub measurement_unit: String,
}

/// One entry of a tag fixture file.
#[derive(Debug, Deserialize)]
pub struct TagFixture {
    pub name: String,
    pub slug: String,
}

/// Insert ingredients, skipping `(name, measurement_unit)` pairs that already exist.
///
/// Returns the number of new rows.
pub async fn import_ingredients<C: ConnectionTrait>(
    db: &C,
    items: &[IngredientFixture],
) -> Result<u64, DbErr> {
    let mut inserted = 0u64;
    for item in items {
        let model = ingredient::ActiveModel {
            name: Set(item.name.trim().to_string()),
            measurement_unit: Set(item.measurement_unit.trim().to_string()),
            ..Default::default()
        };

        let result = ingredient::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => inserted += n,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    info!("Imported {} of {} ingredients", inserted, items.len());
    Ok(inserted)
}

/// Insert tags, skipping any whose name or slug is already taken.
///
/// Returns the number of new rows.
pub async fn import_tags<C: ConnectionTrait>(db: &C, items: &[TagFixture]) -> Result<u64, DbErr> {
    let mut inserted = 0u64;
    for item in items {
        let model = tag::ActiveModel {
            name: Set(item.name.trim().to_string()),
            slug: Set(item.slug.trim().to_string()),
            ..Default::default()
        };

        let result = tag::Entity::insert(model)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => inserted += n,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    info!("Imported {} of {} tags", inserted, items.len());
    Ok(inserted)
}

/// Ensure supporting indexes exist.
///
/// Schema sync only creates the primary keys and unique constraints, which
/// lead with `user_id`; lookups by recipe or author need their own indexes.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        (
            "idx_recipe_author_pub_date",
            Index::create()
                .table(recipe::Entity)
                .col(recipe::Column::AuthorId)
                .col(recipe::Column::PubDate)
                .to_owned(),
        ),
        (
            "idx_subscription_author",
            Index::create()
                .table(subscription::Entity)
                .col(subscription::Column::AuthorId)
                .to_owned(),
        ),
        (
            "idx_favorite_recipe",
            Index::create()
                .table(favorite::Entity)
                .col(favorite::Column::RecipeId)
                .to_owned(),
        ),
        (
            "idx_shopping_cart_recipe",
            Index::create()
                .table(shopping_cart::Entity)
                .col(shopping_cart::Column::RecipeId)
                .to_owned(),
        ),
    ];

    for (name, mut index) in indexes {
        let stmt = index
            .if_not_exists()
            .name(name)
            .to_string(PostgresQueryBuilder);
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    pub name: String,
    /// Media key of the dish picture.
    pub image: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub cooking_time: i32, // in minutes

    /// Lowercase token for `/s/{token}` links. Assigned once on creation.
    #[sea_orm(unique)]
    pub short_link: String,

    #[sea_orm(has_many)]
    pub recipe_ingredients: HasMany<super::recipe_ingredient::Entity>,

    #[sea_orm(has_many, via = "recipe_tag")]
    pub tags: HasMany<super::tag::Entity>,

    #[sea_orm(indexed)]
    pub pub_date: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

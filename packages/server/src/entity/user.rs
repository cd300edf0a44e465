use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login identifier.
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,

    /// Media key of the uploaded avatar.
    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    #[sea_orm(has_many)]
    pub recipes: HasMany<super::recipe::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// "First Last", or the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

use serde::{Deserialize, Serialize};

use crate::entity::ingredient;

#[derive(Serialize, utoipa::ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "мука")]
    pub name: String,
    #[schema(example = "г")]
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct IngredientQuery {
    /// Case-insensitive name search; prefix matches are listed first.
    pub name: Option<String>,
}

/// Stable-sort name matches so that those starting with `query` come first.
///
/// `items` must already be ordered by name.
pub fn rank_by_prefix(items: &mut [IngredientResponse], query: &str) {
    let query = query.to_lowercase();
    items.sort_by_key(|i| !i.name.to_lowercase().starts_with(&query));
}

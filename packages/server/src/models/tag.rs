use serde::Serialize;

use crate::entity::tag;

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Завтрак")]
    pub name: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

use std::collections::{HashMap, HashSet};

use sea_orm::*;

use crate::entity::{recipe, subscription, user};
use crate::models::recipe::RecipeMinified;
use crate::models::user::{UserResponse, UserWithRecipesResponse};

/// IDs among `author_ids` that `viewer` follows.
pub async fn subscribed_author_ids<C: ConnectionTrait>(
    db: &C,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let rows = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(viewer))
        .filter(subscription::Column::AuthorId.is_in(author_ids.iter().copied()))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|s| s.author_id).collect())
}

pub async fn load_user_responses<C: ConnectionTrait>(
    db: &C,
    users: Vec<user::Model>,
    viewer: Option<i32>,
    media_base: &str,
) -> Result<Vec<UserResponse>, DbErr> {
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscribed = subscribed_author_ids(db, viewer, &ids).await?;

    Ok(users
        .into_iter()
        .map(|u| {
            let is_subscribed = subscribed.contains(&u.id);
            UserResponse::new(u, is_subscribed, media_base)
        })
        .collect())
}

pub async fn load_user_response<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    viewer: Option<i32>,
    media_base: &str,
) -> Result<UserResponse, DbErr> {
    let mut responses = load_user_responses(db, vec![user], viewer, media_base).await?;
    responses
        .pop()
        .ok_or_else(|| DbErr::Custom("user response missing".into()))
}

/// Annotate authors with their recipe count and up to `recipes_limit` recipe cards.
pub async fn load_authors_with_recipes<C: ConnectionTrait>(
    db: &C,
    authors: Vec<user::Model>,
    viewer: Option<i32>,
    recipes_limit: Option<usize>,
    media_base: &str,
) -> Result<Vec<UserWithRecipesResponse>, DbErr> {
    let ids: Vec<i32> = authors.iter().map(|u| u.id).collect();
    let subscribed = subscribed_author_ids(db, viewer, &ids).await?;

    let mut by_author: HashMap<i32, Vec<recipe::Model>> = HashMap::new();
    if !ids.is_empty() {
        let recipes = recipe::Entity::find()
            .filter(recipe::Column::AuthorId.is_in(ids))
            .order_by_asc(recipe::Column::PubDate)
            .order_by_asc(recipe::Column::Name)
            .all(db)
            .await?;
        for r in recipes {
            by_author.entry(r.author_id).or_default().push(r);
        }
    }

    Ok(authors
        .into_iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as u64;
            let shown = recipes_limit.unwrap_or(recipes.len());
            let is_subscribed = subscribed.contains(&author.id);
            UserWithRecipesResponse {
                user: UserResponse::new(author, is_subscribed, media_base),
                recipes: recipes
                    .iter()
                    .take(shown)
                    .map(|r| RecipeMinified::new(r, media_base))
                    .collect(),
                recipes_count,
            }
        })
        .collect())
}

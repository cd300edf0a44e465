use std::collections::{HashMap, HashSet};

use sea_orm::*;

use crate::entity::{
    favorite, ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag, user,
};
use crate::error::AppError;
use crate::models::recipe::{RecipeIngredientInput, RecipeIngredientResponse, RecipeResponse};
use crate::models::tag::TagResponse;
use crate::models::user::UserResponse;
use crate::utils::media::media_url;
use crate::utils::short_link;
use crate::utils::users::subscribed_author_ids;

/// Build full recipe representations for `viewer` with a fixed number of queries.
pub async fn load_recipe_responses<C: ConnectionTrait>(
    db: &C,
    recipes: Vec<recipe::Model>,
    viewer: Option<i32>,
    media_base: &str,
) -> Result<Vec<RecipeResponse>, DbErr> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let subscribed = subscribed_author_ids(db, viewer, &author_ids).await?;

    let mut tags: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    let tag_rows = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(ids.iter().copied()))
        .find_also_related(tag::Entity)
        .order_by_asc(recipe_tag::Column::TagId)
        .all(db)
        .await?;
    for (link, t) in tag_rows {
        if let Some(t) = t {
            tags.entry(link.recipe_id).or_default().push(t.into());
        }
    }

    let mut ingredients: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    let ingredient_rows = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(ids.iter().copied()))
        .find_also_related(ingredient::Entity)
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;
    for (line, ing) in ingredient_rows {
        if let Some(ing) = ing {
            ingredients
                .entry(line.recipe_id)
                .or_default()
                .push(RecipeIngredientResponse {
                    id: ing.id,
                    name: ing.name,
                    measurement_unit: ing.measurement_unit,
                    amount: line.amount,
                });
        }
    }

    let (favorited, in_cart) = match viewer {
        Some(uid) => {
            let favorited: HashSet<i32> = favorite::Entity::find()
                .filter(favorite::Column::UserId.eq(uid))
                .filter(favorite::Column::RecipeId.is_in(ids.iter().copied()))
                .all(db)
                .await?
                .into_iter()
                .map(|f| f.recipe_id)
                .collect();
            let in_cart: HashSet<i32> = shopping_cart::Entity::find()
                .filter(shopping_cart::Column::UserId.eq(uid))
                .filter(shopping_cart::Column::RecipeId.is_in(ids.iter().copied()))
                .all(db)
                .await?
                .into_iter()
                .map(|c| c.recipe_id)
                .collect();
            (favorited, in_cart)
        }
        None => (HashSet::new(), HashSet::new()),
    };

    let mut out = Vec::with_capacity(recipes.len());
    for r in recipes {
        let author = authors
            .get(&r.author_id)
            .cloned()
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("author {} of recipe {}", r.author_id, r.id))
            })?;
        out.push(RecipeResponse {
            id: r.id,
            tags: tags.remove(&r.id).unwrap_or_default(),
            author: UserResponse::new(author, subscribed.contains(&r.author_id), media_base),
            ingredients: ingredients.remove(&r.id).unwrap_or_default(),
            is_favorited: favorited.contains(&r.id),
            is_in_shopping_cart: in_cart.contains(&r.id),
            name: r.name,
            image: media_url(media_base, &r.image),
            text: r.text,
            cooking_time: r.cooking_time,
        });
    }
    Ok(out)
}

pub async fn load_recipe_response<C: ConnectionTrait>(
    db: &C,
    recipe: recipe::Model,
    viewer: Option<i32>,
    media_base: &str,
) -> Result<RecipeResponse, DbErr> {
    let mut responses = load_recipe_responses(db, vec![recipe], viewer, media_base).await?;
    responses
        .pop()
        .ok_or_else(|| DbErr::Custom("recipe response missing".into()))
}

/// Fail with a field error unless every tag ID exists.
pub async fn ensure_tags_exist<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<(), AppError> {
    let found = tag::Entity::find()
        .filter(tag::Column::Id.is_in(ids.iter().copied()))
        .count(db)
        .await?;
    if found as usize != ids.len() {
        return Err(AppError::field("tags", "Unknown tag id"));
    }
    Ok(())
}

/// Fail with a field error unless every ingredient ID exists.
pub async fn ensure_ingredients_exist<C: ConnectionTrait>(
    db: &C,
    items: &[RecipeIngredientInput],
) -> Result<(), AppError> {
    let found = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(items.iter().map(|i| i.id)))
        .count(db)
        .await?;
    if found as usize != items.len() {
        return Err(AppError::field("ingredients", "Unknown ingredient id"));
    }
    Ok(())
}

/// Replace a recipe's tag and ingredient sets.
pub async fn replace_recipe_links<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    tag_ids: &[i32],
    items: &[RecipeIngredientInput],
) -> Result<(), DbErr> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;

    recipe_tag::Entity::insert_many(tag_ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    }))
    .exec_without_returning(db)
    .await?;

    recipe_ingredient::Entity::insert_many(items.iter().map(|item| {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.id),
            amount: Set(item.amount),
            ..Default::default()
        }
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Insert a recipe under a fresh random short link.
pub async fn insert_with_short_link(
    txn: &DatabaseTransaction,
    model: recipe::ActiveModel,
) -> Result<recipe::Model, AppError> {
    insert_with_tokens(txn, model, || {
        short_link::generate(&mut rand::rng(), short_link::TOKEN_LENGTH)
    })
    .await
}

/// Insert a recipe, drawing short-link tokens from `next_token` until one is free.
///
/// Each attempt runs in a savepoint so a collision leaves the outer
/// transaction usable. Gives up after `short_link::MAX_ATTEMPTS` draws.
pub async fn insert_with_tokens<F>(
    txn: &DatabaseTransaction,
    mut model: recipe::ActiveModel,
    mut next_token: F,
) -> Result<recipe::Model, AppError>
where
    F: FnMut() -> String,
{
    for attempt in 1..=short_link::MAX_ATTEMPTS {
        model.short_link = Set(next_token());

        let savepoint = txn.begin().await?;
        match model.clone().insert(&savepoint).await {
            Ok(created) => {
                savepoint.commit().await?;
                return Ok(created);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                savepoint.rollback().await?;
                tracing::debug!(attempt, "Short link collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(format!(
        "No free short link after {} attempts",
        short_link::MAX_ATTEMPTS
    )))
}

use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::recipe;
use crate::error::AppError;
use crate::models::tag::TagResponse;
use crate::models::user::UserResponse;
use crate::utils::media::media_url;

use super::shared::{validate_length, validate_range, validate_unique_ids};

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 32_000;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32_000;

/// One ingredient line of a recipe write request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecipeIngredientInput {
    /// Ingredient ID.
    #[schema(example = 1123)]
    pub id: i32,
    #[schema(example = 10)]
    pub amount: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<RecipeIngredientInput>,
    /// Tag IDs.
    #[schema(example = json!([1, 2]))]
    pub tags: Vec<i32>,
    /// Image as `data:image/<png|jpeg|gif|webp>;base64,<payload>`.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub image: String,
    #[schema(example = "Нечто съедобное (это не точно)")]
    pub name: String,
    #[schema(example = "Приготовьте как нибудь эти ингредиенты")]
    pub text: String,
    /// Minutes.
    #[schema(example = 5)]
    pub cooking_time: i32,
}

/// `ingredients` and `tags` are required and replace the current sets.
/// `image` may be omitted to keep the current picture.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<RecipeIngredientInput>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

fn validate_ingredients(ingredients: &[RecipeIngredientInput]) -> Result<(), AppError> {
    let ids: Vec<i32> = ingredients.iter().map(|i| i.id).collect();
    validate_unique_ids("ingredients", &ids)?;
    for item in ingredients {
        validate_range("amount", item.amount, MIN_AMOUNT, MAX_AMOUNT)?;
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::field("text", "text must not be empty"));
    }
    Ok(())
}

pub fn validate_create_recipe(payload: &CreateRecipeRequest) -> Result<(), AppError> {
    validate_ingredients(&payload.ingredients)?;
    validate_unique_ids("tags", &payload.tags)?;
    if payload.image.trim().is_empty() {
        return Err(AppError::field("image", "image must not be empty"));
    }
    validate_length("name", &payload.name, 1, 256)?;
    validate_text(&payload.text)?;
    validate_range(
        "cooking_time",
        payload.cooking_time,
        MIN_COOKING_TIME,
        MAX_COOKING_TIME,
    )
}

pub fn validate_update_recipe(payload: &UpdateRecipeRequest) -> Result<(), AppError> {
    let ingredients = payload
        .ingredients
        .as_deref()
        .ok_or_else(|| AppError::field("ingredients", "ingredients is required"))?;
    validate_ingredients(ingredients)?;
    let tags = payload
        .tags
        .as_deref()
        .ok_or_else(|| AppError::field("tags", "tags is required"))?;
    validate_unique_ids("tags", tags)?;

    if let Some(ref image) = payload.image
        && image.trim().is_empty()
    {
        return Err(AppError::field("image", "image must not be empty"));
    }
    if let Some(ref name) = payload.name {
        validate_length("name", name, 1, 256)?;
    }
    if let Some(ref text) = payload.text {
        validate_text(text)?;
    }
    if let Some(cooking_time) = payload.cooking_time {
        validate_range(
            "cooking_time",
            cooking_time,
            MIN_COOKING_TIME,
            MAX_COOKING_TIME,
        )?;
    }
    Ok(())
}

/// Ingredient line of a recipe, with its amount.
#[derive(Serialize, Clone, FromQueryResult, utoipa::ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient ID.
    #[schema(example = 1123)]
    pub id: i32,
    #[schema(example = "Картофель отварной")]
    pub name: String,
    #[schema(example = "г")]
    pub measurement_unit: String,
    #[schema(example = 1)]
    pub amount: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Image URL.
    #[schema(example = "/media/3f2a...9c.png")]
    pub image: String,
    pub text: String,
    /// Minutes.
    #[schema(example = 5)]
    pub cooking_time: i32,
}

/// Short recipe card used by favorites, the cart and subscriptions.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeMinified {
    #[schema(example = 7)]
    pub id: i32,
    pub name: String,
    #[schema(example = "/media/3f2a...9c.png")]
    pub image: String,
    #[schema(example = 5)]
    pub cooking_time: i32,
}

impl RecipeMinified {
    pub fn new(recipe: &recipe::Model, media_base: &str) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media_url(media_base, &recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecipeListQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Only recipes by this author.
    pub author: Option<i32>,
    /// Tag slugs; may repeat (`tags=lunch&tags=dinner`). Recipes with any of them match.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `1` or `true` to list only the caller's favorites.
    pub is_favorited: Option<String>,
    /// `1` or `true` to list only recipes in the caller's shopping cart.
    pub is_in_shopping_cart: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "https://foodgram.example/s/3d0x7k/")]
    pub short_link: String,
}

/// One aggregated line of a shopping list.
#[derive(Debug, FromQueryResult)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Render a shopping list as plain text.
pub fn render_shopping_list(
    owner: &str,
    generated_at: DateTime<Utc>,
    items: &[ShoppingListItem],
) -> String {
    let mut out = format!(
        "Shopping list of:\n\n{owner}\n{}\n\n",
        generated_at.format("%Y-%m-%d %H:%M")
    );
    for item in items {
        out.push_str(&format!(
            "{} ({}): {}\n",
            item.name, item.measurement_unit, item.total
        ));
    }
    out.push_str("\n\nHappy cooking!");
    out
}

/// `Content-Disposition` value for a user's shopping list download.
pub fn shopping_list_disposition(username: &str) -> String {
    let filename = format!("{username}'s_shopping_list.txt");
    format!("attachment; filename*=UTF-8''{}", encode_rfc5987(&filename))
}

fn encode_rfc5987(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::handlers::recipe::find_recipe_by_short_link;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/s/{token}",
    tag = "Recipes",
    operation_id = "followShortLink",
    summary = "Follow a recipe short link",
    description = "Redirects to the recipe page `/recipes/{id}/`.",
    params(("token" = String, Path, description = "Short-link token (case-insensitive)")),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown short link (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(token))]
pub async fn follow_short_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let recipe = find_recipe_by_short_link(&state.db, &token).await?;
    let location = format!("/recipes/{}/", recipe.id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

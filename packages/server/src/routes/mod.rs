mod api;

use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    api::routes().layer(json_body_limit(config))
}

/// Routes outside `/api`: short-link redirects and uploaded media.
pub fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::short_link::follow_short_link))
        .nest(
            "/media",
            OpenApiRouter::new().routes(routes!(handlers::media::serve_media)),
        )
}

/// Images arrive base64-encoded inside JSON bodies, so the body limit has to
/// cover the largest accepted image after encoding plus the other fields.
fn json_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let encoded = config.media.max_image_size.div_ceil(3) * 4;
    let limit = usize::try_from(encoded + 64 * 1024).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(limit)
}

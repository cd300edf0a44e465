use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/tags", tag_routes())
        .nest("/ingredients", ingredient_routes())
        .nest("/recipes", recipe_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::logout))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_users,
            handlers::user::register
        ))
        .routes(routes!(handlers::user::me))
        .routes(routes!(
            handlers::user::set_avatar,
            handlers::user::delete_avatar
        ))
        .routes(routes!(handlers::user::set_password))
        .routes(routes!(handlers::subscription::list_subscriptions))
        .routes(routes!(handlers::user::get_user))
        .routes(routes!(
            handlers::subscription::subscribe,
            handlers::subscription::unsubscribe
        ))
}

fn tag_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tag::list_tags))
        .routes(routes!(handlers::tag::get_tag))
}

fn ingredient_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::ingredient::list_ingredients))
        .routes(routes!(handlers::ingredient::get_ingredient))
}

fn recipe_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::recipe::list_recipes,
            handlers::recipe::create_recipe
        ))
        .routes(routes!(handlers::shopping_list::download_shopping_list))
        .routes(routes!(handlers::recipe::get_recipe_by_short_link))
        .routes(routes!(
            handlers::recipe::get_recipe,
            handlers::recipe::update_recipe,
            handlers::recipe::delete_recipe
        ))
        .routes(routes!(handlers::recipe::get_short_link))
        .routes(routes!(
            handlers::relation::add_favorite,
            handlers::relation::remove_favorite
        ))
        .routes(routes!(
            handlers::relation::add_to_cart,
            handlers::relation::remove_from_cart
        ))
}


mod auth;
mod media;
mod recipes;
mod relations;
mod shopping_list;
mod subscriptions;

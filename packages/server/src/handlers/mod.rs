pub mod auth;
pub mod ingredient;
pub mod media;
pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod short_link;
pub mod subscription;
pub mod tag;
pub mod user;

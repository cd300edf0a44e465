pub mod hash;
pub mod jwt;
pub mod media;
pub mod recipes;
pub mod short_link;
pub mod users;

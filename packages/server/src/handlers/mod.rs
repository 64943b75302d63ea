pub mod auth;
pub mod health;
pub mod photos;
pub mod users;

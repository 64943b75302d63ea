pub mod credentials;
pub mod photos;
pub mod users;

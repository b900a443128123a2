pub mod analytics;
pub mod auth;
pub mod dreams;
pub mod feed;
pub mod health;
pub mod profile;
pub mod reactions;

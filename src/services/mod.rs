pub mod auth;
pub mod env;
pub mod inference;

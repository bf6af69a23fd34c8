pub mod admin;
pub mod auth;
pub mod comments;
pub mod products;
pub mod system;
pub mod users;
pub mod votes;

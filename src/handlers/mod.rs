pub mod auth;
pub mod plans;
pub mod system;
pub mod user;

pub mod auth;
pub mod cors;

pub use auth::{get_auth_context, AuthMiddleware};
pub use cors::create_cors;

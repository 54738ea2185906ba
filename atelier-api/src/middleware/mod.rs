pub mod auth;

pub use auth::{auth_middleware, staff_auth_middleware, Claims};

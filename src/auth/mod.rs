//! Administrator authentication.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use handlers::*;
pub use middleware::{AdminContext, LOGIN_PATH};

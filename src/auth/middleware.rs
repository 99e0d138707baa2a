//! Admin authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::Session;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/admin/login";

/// Logged-in administrator.
/// Add this as a handler parameter to require an admin login.
/// Redirects to /admin/login?next=<path> if not logged in.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub username: String,
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match session.data.admin_username {
            Some(username) => Ok(AdminContext { username }),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/admin/");
                Err(Redirect::to(&login_redirect(next)).into_response())
            }
        }
    }
}

/// Login URL that returns to `next` afterwards
pub fn login_redirect(next: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next))
}

/// Only local admin paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with("/admin") && !n.starts_with("//") => n,
        _ => "/admin/",
    }
}

//! Admin login and logout handlers.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::db as auth_db;
use super::middleware::safe_next;
use crate::db::{try_lock, LogOnError};
use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
    pub next: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// GET /admin/login - Show login page
pub async fn login_page(session: Session, Query(query): Query<LoginQuery>) -> Result<Response, AppError> {
    let next = safe_next(query.next.as_deref()).to_string();

    // Already logged in
    if session.data.admin_username.is_some() {
        return Ok(Redirect::to(&next).into_response());
    }

    let template = LoginTemplate {
        error: None,
        username: String::new(),
        next,
    };
    Ok(Html(template.render()?).into_response())
}

/// POST /admin/login - Process login
pub async fn login_submit(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).to_string();

    let failure = |error: &str| -> Result<Response, AppError> {
        let template = LoginTemplate {
            error: Some(error.to_string()),
            username: form.username.clone(),
            next: next.clone(),
        };
        Ok(Html(template.render()?).into_response())
    };

    if form.username.trim().is_empty() || form.password.is_empty() {
        return failure("Username and password are required");
    }

    let user = {
        let conn = try_lock(&state.db)?;
        let user = auth_db::authenticate(&conn, &form.username, &form.password)?;
        if let Some(user) = &user {
            auth_db::update_last_login(&conn, user.id)
                .log_warn(&format!("Failed to update last login for admin {}", user.id));
        }
        user
    };

    let Some(user) = user else {
        tracing::info!("Failed admin login for '{}'", form.username.trim());
        return failure("Invalid username or password");
    };

    tracing::info!("Admin '{}' logged in", user.username);
    session.regenerate_id();
    session.data.admin_username = Some(user.username);
    Ok((session.commit(), Redirect::to(&next)).into_response())
}

/// GET|POST /admin/logout - Forget the admin login, keep study progress
pub async fn logout(mut session: Session) -> impl IntoResponse {
    if let Some(username) = session.data.admin_username.take() {
        tracing::info!("Admin '{}' logged out", username);
    }
    (session.commit(), Redirect::to("/admin/login"))
}

//! Application error type and its HTTP mapping.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::db::DbLockError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{0} not found")]
  NotFound(String),

  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("{0}")]
  Unavailable(#[from] DbLockError),

  #[error("Template error: {0}")]
  Template(#[from] askama::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl AppError {
  pub fn not_found(what: impl Into<String>) -> Self {
    Self::NotFound(what.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Database(_) | Self::Template(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
  status: u16,
  heading: &'static str,
  message: String,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let (heading, message) = match &self {
      Self::NotFound(what) => {
        tracing::info!("Not found: {}", what);
        ("Page not found", format!("{} does not exist.", what))
      }
      Self::Validation(msg) => {
        tracing::info!("Rejected request: {}", msg);
        ("Invalid request", msg.clone())
      }
      other => {
        tracing::error!("Request failed: {}", other);
        (
          "Something went wrong",
          "The server could not complete the request. Please try again.".to_string(),
        )
      }
    };

    let template = ErrorTemplate {
      status: status.as_u16(),
      heading,
      message,
    };
    (status, Html(template.render().unwrap_or_default())).into_response()
  }
}

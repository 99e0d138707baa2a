pub mod admin;
pub mod chapters;
pub mod quiz;
pub mod templates;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::db::{self, try_lock, LogOnError};
use crate::error::AppError;
use crate::state::AppState;

use templates::HomeTemplate;

/// GET / - landing page
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
  let chapter_count = {
    let conn = try_lock(&state.db)?;
    db::count_chapters(&conn).log_warn_default("Failed to count chapters")
  };

  let template = HomeTemplate { chapter_count };
  Ok(Html(template.render()?))
}

pub use chapters::{chapter_detail, chapter_finished, chapter_list, chapter_restart, chapter_submit};
pub use quiz::quiz_submit;

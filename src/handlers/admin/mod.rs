//! Record management for chapters, flashcards and tests.
//!
//! Every handler here takes an [`AdminContext`], so anonymous requests are
//! redirected to the login page before any work is done.

pub mod chapters;
pub mod flashcards;
pub mod templates;

use askama::Template;
use axum::{extract::State, response::Html};

use crate::auth::AdminContext;
use crate::db::{self, try_lock};
use crate::domain::is_valid_slug;
use crate::error::AppError;
use crate::state::AppState;

use templates::AdminIndexTemplate;

/// GET /admin/ - record counts and links to each list
pub async fn index(admin: AdminContext, State(state): State<AppState>) -> Result<Html<String>, AppError> {
  let (chapter_count, flashcard_count, test_count) = {
    let conn = try_lock(&state.db)?;
    (
      db::count_chapters(&conn)?,
      db::count_flashcards(&conn)?,
      db::count_tests(&conn)?,
    )
  };

  let template = AdminIndexTemplate {
    username: admin.username,
    chapter_count,
    flashcard_count,
    test_count,
  };
  Ok(Html(template.render()?))
}

/// Format and uniqueness checks shared by every slugged record
pub(crate) fn slug_errors(slug: &str, taken: bool) -> Vec<String> {
  let mut errors = Vec::new();
  if slug.is_empty() {
    errors.push("Slug could not be derived; please enter one".to_string());
  } else if !is_valid_slug(slug) {
    errors.push("Slug may only contain letters, numbers, underscores and hyphens".to_string());
  } else if taken {
    errors.push(format!("Slug '{}' is already in use", slug));
  }
  errors
}

pub use chapters::{chapter_create, chapter_delete, chapter_edit, chapter_list, chapter_new, chapter_update};
pub use flashcards::{
  flashcard_create, flashcard_delete, flashcard_edit, flashcard_list, flashcard_new, flashcard_status,
  flashcard_update,
};
pub use quiz_tests::{test_create, test_delete, test_edit, test_list, test_new, test_update};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slug_errors() {
    assert!(slug_errors("unit-1", false).is_empty());
    assert_eq!(slug_errors("", false).len(), 1);
    assert_eq!(slug_errors("bad slug", false).len(), 1);
    assert_eq!(slug_errors("unit-1", true), vec!["Slug 'unit-1' is already in use"]);
  }
}

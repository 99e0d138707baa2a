//! Chapter list, create, edit and delete.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::AdminContext;
use crate::db::{self, try_lock, FlashcardFilter};
use crate::domain::{Chapter, ChapterDraft};
use crate::error::AppError;
use crate::state::AppState;

use super::slug_errors;
use super::templates::{ChapterAdminListTemplate, ChapterAdminRow, ChapterForm, ChapterFormTemplate, SelectOption};

const LIST_URL: &str = "/admin/chapters/";

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub q: String,
}

impl From<ChapterForm> for ChapterDraft {
  fn from(form: ChapterForm) -> Self {
    Self {
      title: form.title,
      description: form.description,
      slug: form.slug,
      card_ids: form.cards,
    }
  }
}

fn load(conn: &Connection, id: i64) -> Result<Chapter, AppError> {
  db::get_chapter(conn, id)?.ok_or_else(|| AppError::not_found(format!("Chapter #{}", id)))
}

fn form_template(
  conn: &Connection,
  username: String,
  existing: Option<i64>,
  draft: &ChapterDraft,
  errors: Vec<String>,
) -> Result<ChapterFormTemplate, AppError> {
  let all_cards = db::list_flashcards(conn, &FlashcardFilter::default())?;
  let (heading, action_url, delete_url) = match existing {
    Some(id) => (
      "Edit chapter".to_string(),
      format!("/admin/chapters/{}/edit", id),
      Some(format!("/admin/chapters/{}/delete", id)),
    ),
    None => ("Add chapter".to_string(), "/admin/chapters/new".to_string(), None),
  };

  Ok(ChapterFormTemplate {
    username,
    heading,
    action_url,
    delete_url,
    title: draft.title.clone(),
    description: draft.description.clone(),
    slug: draft.slug.clone(),
    cards: SelectOption::cards(&all_cards, &draft.card_ids),
    errors,
  })
}

/// Validation messages for a draft; empty means it can be saved
fn validate(conn: &Connection, draft: &ChapterDraft, existing: Option<i64>) -> Result<Vec<String>, AppError> {
  let mut errors = draft.validate();
  if errors.is_empty() {
    let slug = draft.resolved_slug();
    let taken = db::chapter_slug_taken(conn, &slug, existing)?;
    errors.extend(slug_errors(&slug, taken));
  }
  Ok(errors)
}

/// GET /admin/chapters/?q=
pub async fn chapter_list(
  admin: AdminContext,
  State(state): State<AppState>,
  Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
  let chapters = {
    let conn = try_lock(&state.db)?;
    db::search_chapters(&conn, Some(&query.q))?
  };

  let chapters = chapters
    .into_iter()
    .map(|c| ChapterAdminRow {
      edit_url: format!("/admin/chapters/{}/edit", c.id),
      public_url: c.url(),
      title: c.title,
      slug: c.slug,
    })
    .collect();

  let template = ChapterAdminListTemplate {
    username: admin.username,
    query: query.q,
    chapters,
  };
  Ok(Html(template.render()?))
}

/// GET /admin/chapters/new
pub async fn chapter_new(admin: AdminContext, State(state): State<AppState>) -> Result<Html<String>, AppError> {
  let conn = try_lock(&state.db)?;
  let template = form_template(&conn, admin.username, None, &ChapterDraft::default(), Vec::new())?;
  drop(conn);
  Ok(Html(template.render()?))
}

/// POST /admin/chapters/new
pub async fn chapter_create(
  admin: AdminContext,
  State(state): State<AppState>,
  Form(form): Form<ChapterForm>,
) -> Result<Response, AppError> {
  let draft = ChapterDraft::from(form);
  let conn = try_lock(&state.db)?;

  let errors = validate(&conn, &draft, None)?;
  if !errors.is_empty() {
    let template = form_template(&conn, admin.username, None, &draft, errors)?;
    drop(conn);
    return Ok(Html(template.render()?).into_response());
  }

  let id = db::insert_chapter(&conn, &draft)?;
  tracing::info!("Admin '{}' created chapter #{} '{}'", admin.username, id, draft.title.trim());
  Ok(Redirect::to(LIST_URL).into_response())
}

/// GET /admin/chapters/{id}/edit
pub async fn chapter_edit(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
  let conn = try_lock(&state.db)?;
  let chapter = load(&conn, id)?;
  let draft = ChapterDraft {
    card_ids: db::chapter_card_ids(&conn, id)?,
    title: chapter.title,
    description: chapter.description,
    slug: chapter.slug,
  };
  let template = form_template(&conn, admin.username, Some(id), &draft, Vec::new())?;
  drop(conn);
  Ok(Html(template.render()?))
}

/// POST /admin/chapters/{id}/edit
pub async fn chapter_update(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Form(form): Form<ChapterForm>,
) -> Result<Response, AppError> {
  let draft = ChapterDraft::from(form);
  let conn = try_lock(&state.db)?;
  load(&conn, id)?;

  let errors = validate(&conn, &draft, Some(id))?;
  if !errors.is_empty() {
    let template = form_template(&conn, admin.username, Some(id), &draft, errors)?;
    drop(conn);
    return Ok(Html(template.render()?).into_response());
  }

  db::update_chapter(&conn, id, &draft)?;
  tracing::info!("Admin '{}' updated chapter #{}", admin.username, id);
  Ok(Redirect::to(LIST_URL).into_response())
}

/// POST /admin/chapters/{id}/delete
pub async fn chapter_delete(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
  let deleted = {
    let conn = try_lock(&state.db)?;
    db::delete_chapter(&conn, id)?
  };
  if !deleted {
    return Err(AppError::not_found(format!("Chapter #{}", id)));
  }
  tracing::info!("Admin '{}' deleted chapter #{}", admin.username, id);
  Ok(Redirect::to(LIST_URL))
}

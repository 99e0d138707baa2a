//! Chapter listing and the card-by-card study flow.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use rusqlite::Connection;

use crate::db::{self, try_lock};
use crate::domain::{Chapter, Flashcard, MarkAs};
use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;
use crate::study::{self, StudyAction, StudyPosition};

use super::quiz::quiz_page;
use super::templates::{
  CardView, ChapterListTemplate, ChapterRow, FinishedTemplate, MarkOption, StudyForm, StudyQuery,
  StudyTemplate, TestLink,
};

/// Resolve a chapter slug or fail with 404
pub(super) fn load_chapter(conn: &Connection, slug: &str) -> Result<Chapter, AppError> {
  db::get_chapter_by_slug(conn, slug)?.ok_or_else(|| AppError::not_found(format!("Chapter '{}'", slug)))
}

fn study_template(chapter: &Chapter, cards: &[Flashcard], pos: usize, error: Option<String>) -> StudyTemplate {
  let (card, position, total, progress_percent, selected) = match study::position_view(cards, pos) {
    StudyPosition::Card {
      card,
      number,
      total,
      progress_percent,
    } => (Some(CardView::from(card)), number, total, progress_percent, card.mark_as),
    StudyPosition::Finished { total } => (None, total, total, 100, MarkAs::default()),
  };

  StudyTemplate {
    chapter_title: chapter.title.clone(),
    chapter_description: chapter.description.clone(),
    chapter_url: chapter.url(),
    finished_url: study::finished_url(&chapter.slug),
    restart_url: study::restart_url(&chapter.slug),
    card,
    position,
    total,
    progress_percent,
    mark_options: MarkOption::all(selected),
    error,
  }
}

/// GET /capitulos/
pub async fn chapter_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
  let overviews = {
    let conn = try_lock(&state.db)?;
    db::list_chapters(&conn)?
  };

  let chapters = overviews
    .into_iter()
    .map(|o| ChapterRow {
      url: o.chapter.url(),
      title: o.chapter.title,
      description: o.chapter.description,
      total_cards: o.total_cards,
      finished: o.finished,
    })
    .collect();

  Ok(Html(ChapterListTemplate { chapters }.render()?))
}

/// GET /capitulos/{slug}/ - current card, terminal state, or a quiz with `?show_test=`
pub async fn chapter_detail(
  State(state): State<AppState>,
  mut session: Session,
  Path(slug): Path<String>,
  Query(query): Query<StudyQuery>,
) -> Result<Response, AppError> {
  let conn = try_lock(&state.db)?;
  let chapter = load_chapter(&conn, &slug)?;
  study::enter_chapter(&mut session.data, &chapter, query.wants_restart());

  if let Some(test_slug) = query.show_test.as_deref().filter(|s| !s.is_empty()) {
    let page = quiz_page(&conn, &chapter, test_slug, state.config.quiz_enabled)?;
    drop(conn);
    return Ok(match page {
      Some(template) => (session.commit(), Html(template.render()?)).into_response(),
      None => (session.commit(), Redirect::to(&chapter.url())).into_response(),
    });
  }

  let cards = db::chapter_cards(&conn, chapter.id)?;
  drop(conn);

  let template = study_template(&chapter, &cards, session.data.position(chapter.id), None);
  Ok((session.commit(), Html(template.render()?)).into_response())
}

/// POST /capitulos/{slug}/ - `action=prev` steps back, anything else marks the card and advances
pub async fn chapter_submit(
  State(state): State<AppState>,
  mut session: Session,
  Path(slug): Path<String>,
  Query(query): Query<StudyQuery>,
  Form(form): Form<StudyForm>,
) -> Result<Response, AppError> {
  let conn = try_lock(&state.db)?;
  let chapter = load_chapter(&conn, &slug)?;
  study::enter_chapter(&mut session.data, &chapter, query.wants_restart());

  if StudyAction::from_form(form.action.as_deref()) == StudyAction::Prev {
    drop(conn);
    let pos = study::step_back(&mut session.data, chapter.id);
    tracing::debug!("Chapter '{}': back to position {}", chapter.slug, pos);
    return Ok((session.commit(), Redirect::to(&chapter.url())).into_response());
  }

  let cards = db::chapter_cards(&conn, chapter.id)?;

  let Some(mark_as) = form.mark_as.as_deref().and_then(MarkAs::from_str) else {
    drop(conn);
    let pos = session.data.position(chapter.id);
    let template = study_template(
      &chapter,
      &cards,
      pos,
      Some("Choose whether to review this card again or mark it as learned.".to_string()),
    );
    return Ok((session.commit(), Html(template.render()?)).into_response());
  };

  if let Some(index) = study::card_to_mark(&session.data, chapter.id, cards.len()) {
    let card = &cards[index];
    db::mark_flashcard(&conn, card.id, mark_as)?;
    let pos = study::advance(&mut session.data, chapter.id);
    tracing::debug!(
      "Chapter '{}': card {} marked {}, now at position {}",
      chapter.slug,
      card.id,
      mark_as.as_str(),
      pos
    );
  }
  drop(conn);

  let target = study::next_redirect(&chapter, session.data.position(chapter.id), cards.len());
  Ok((session.commit(), Redirect::to(&target)).into_response())
}

/// GET /capitulos/{slug}/finished/
pub async fn chapter_finished(
  State(state): State<AppState>,
  Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
  let (chapter, stats, tests) = {
    let conn = try_lock(&state.db)?;
    let chapter = load_chapter(&conn, &slug)?;
    let stats = db::chapter_stats(&conn, chapter.id)?;
    let tests = if state.config.quiz_enabled {
      db::list_tests(&conn)?
    } else {
      Vec::new()
    };
    (chapter, stats, tests)
  };

  let chapter_url = chapter.url();
  let tests = tests
    .into_iter()
    .map(|t| TestLink {
      url: format!("{}?show_test={}", chapter_url, urlencoding::encode(&t.slug)),
      title: t.title,
      description: t.description,
    })
    .collect();

  let template = FinishedTemplate {
    chapter_title: chapter.title,
    restart_url: study::restart_url(&chapter.slug),
    chapter_url,
    total: stats.total,
    learned: stats.learned,
    review: stats.review,
    tests,
  };
  Ok(Html(template.render()?))
}

/// GET|POST /capitulos/{slug}/restart/ - forget progress and start from the first card
pub async fn chapter_restart(
  State(state): State<AppState>,
  mut session: Session,
  Path(slug): Path<String>,
) -> Result<Response, AppError> {
  let chapter = {
    let conn = try_lock(&state.db)?;
    let chapter = load_chapter(&conn, &slug)?;
    let reset = db::reset_chapter_progress(&conn, chapter.id)?;
    tracing::info!("Chapter '{}' restarted ({} cards reset)", chapter.slug, reset);
    chapter
  };

  study::restart(&mut session.data, &chapter);
  Ok((session.commit(), Redirect::to(&study::restart_target(&chapter.slug))).into_response())
}

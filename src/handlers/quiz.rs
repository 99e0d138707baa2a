//! Quiz mode: questions from a test, answered inside a chapter.

use std::collections::HashMap;

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use rusqlite::Connection;

use crate::db::{self, try_lock};
use crate::domain::{Chapter, Test};
use crate::error::AppError;
use crate::quiz::{self, QuizQuestion};
use crate::state::AppState;

use super::chapters::load_chapter;
use super::templates::{AnswerView, QuestionView, QuizResultTemplate, QuizTemplate};

/// Form field carrying the test slug on submission
const TEST_FIELD: &str = "test";

/// The test and its questions, or None when the quiz should silently fall back
/// (quiz disabled, unknown test, no questions)
fn load_quiz(
  conn: &Connection,
  test_slug: &str,
  enabled: bool,
) -> Result<Option<(Test, Vec<QuizQuestion>)>, AppError> {
  if !enabled {
    tracing::debug!("Quiz requested while disabled");
    return Ok(None);
  }
  let Some(test) = db::get_test_by_slug(conn, test_slug)? else {
    tracing::debug!("Unknown test '{}'", test_slug);
    return Ok(None);
  };
  let cards = db::test_questions(conn, test.id)?;
  let questions = quiz::build_questions(&test, &cards);
  if questions.is_empty() {
    tracing::debug!("Test '{}' has no questions", test.slug);
    return Ok(None);
  }
  Ok(Some((test, questions)))
}

/// Quiz form for `?show_test=<test_slug>`, or None to fall back to the study view
pub(super) fn quiz_page(
  conn: &Connection,
  chapter: &Chapter,
  test_slug: &str,
  enabled: bool,
) -> Result<Option<QuizTemplate>, AppError> {
  let Some((test, questions)) = load_quiz(conn, test_slug, enabled)? else {
    return Ok(None);
  };

  let questions = questions
    .into_iter()
    .enumerate()
    .map(|(i, q)| QuestionView {
      field: QuizQuestion::field_name(i),
      number: i + 1,
      prompt: q.prompt,
    })
    .collect();

  Ok(Some(QuizTemplate {
    chapter_title: chapter.title.clone(),
    chapter_url: chapter.url(),
    test_title: test.title,
    test_description: test.description,
    test_slug: test.slug,
    submit_url: format!("{}quiz/", chapter.url()),
    questions,
  }))
}

/// POST /capitulos/{slug}/quiz/ - grade submitted answers, nothing is stored
pub async fn quiz_submit(
  State(state): State<AppState>,
  Path(slug): Path<String>,
  Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
  let (chapter, loaded) = {
    let conn = try_lock(&state.db)?;
    let chapter = load_chapter(&conn, &slug)?;
    let test_slug = form.get(TEST_FIELD).map(String::as_str).unwrap_or_default();
    let loaded = load_quiz(&conn, test_slug, state.config.quiz_enabled)?;
    (chapter, loaded)
  };

  let Some((test, questions)) = loaded else {
    return Ok(Redirect::to(&chapter.url()).into_response());
  };

  let result = quiz::grade(&questions, &form);
  tracing::info!(
    "Quiz '{}' in chapter '{}': {}/{} correct",
    test.slug,
    chapter.slug,
    result.correct,
    result.total
  );

  let chapter_url = chapter.url();
  let template = QuizResultTemplate {
    chapter_title: chapter.title,
    retry_url: format!("{}?show_test={}", chapter_url, urlencoding::encode(&test.slug)),
    chapter_url,
    test_title: test.title,
    correct: result.correct,
    total: result.total,
    passed: result.passed,
    answers: result
      .answers
      .into_iter()
      .enumerate()
      .map(|(i, a)| AnswerView {
        number: i + 1,
        prompt: a.prompt,
        given: a.given,
        expected: a.expected,
        correct: a.correct,
      })
      .collect(),
  };
  Ok(Html(template.render()?).into_response())
}

//! Template and form structs for the public study pages.

use askama::Template;
use serde::Deserialize;

use crate::domain::{Flashcard, MarkAs};
use crate::paths;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
  pub chapter_count: i64,
}

pub struct ChapterRow {
  pub title: String,
  pub description: String,
  pub url: String,
  pub total_cards: i64,
  pub finished: bool,
}

#[derive(Template)]
#[template(path = "chapters/list.html")]
pub struct ChapterListTemplate {
  pub chapters: Vec<ChapterRow>,
}

/// Flashcard fields prepared for display
pub struct CardView {
  pub category_label: &'static str,
  pub word_english: String,
  pub word_spanish: String,
  pub ipa_english: String,
  pub ipa_spanish: String,
  pub audio_english_url: Option<String>,
  pub audio_spanish_url: Option<String>,
  pub content: String,
  pub mean_english: String,
  pub mean_espanish: String,
  pub image_url: Option<String>,
}

impl From<&Flashcard> for CardView {
  fn from(card: &Flashcard) -> Self {
    Self {
      category_label: card.category.label(),
      word_english: card.word_english.clone(),
      word_spanish: card.word_spanish.clone(),
      ipa_english: card.ipa_english.clone(),
      ipa_spanish: card.ipa_spanish.clone(),
      audio_english_url: card.audio_english.as_deref().map(paths::media_url),
      audio_spanish_url: card.audio_spanish.as_deref().map(paths::media_url),
      content: card.content.clone(),
      mean_english: card.mean_english.clone(),
      mean_espanish: card.mean_espanish.clone(),
      image_url: card.image_url.clone(),
    }
  }
}

/// One radio button of a status choice
pub struct MarkOption {
  pub value: &'static str,
  pub label: &'static str,
  pub selected: bool,
}

impl MarkOption {
  pub fn all(selected: MarkAs) -> Vec<Self> {
    MarkAs::ALL
      .iter()
      .map(|m| Self {
        value: m.as_str(),
        label: m.label(),
        selected: *m == selected,
      })
      .collect()
  }
}

#[derive(Template)]
#[template(path = "chapters/detail.html")]
pub struct StudyTemplate {
  pub chapter_title: String,
  pub chapter_description: String,
  pub chapter_url: String,
  pub finished_url: String,
  pub restart_url: String,
  /// None once the cursor is past the last card
  pub card: Option<CardView>,
  /// 1-based position, or the total in the terminal state
  pub position: usize,
  pub total: usize,
  pub progress_percent: u32,
  pub mark_options: Vec<MarkOption>,
  pub error: Option<String>,
}

pub struct TestLink {
  pub title: String,
  pub description: String,
  pub url: String,
}

#[derive(Template)]
#[template(path = "chapters/finished.html")]
pub struct FinishedTemplate {
  pub chapter_title: String,
  pub chapter_url: String,
  pub restart_url: String,
  pub total: i64,
  pub learned: i64,
  pub review: i64,
  /// Empty when the quiz is disabled
  pub tests: Vec<TestLink>,
}

pub struct QuestionView {
  pub field: String,
  pub number: usize,
  pub prompt: String,
}

#[derive(Template)]
#[template(path = "chapters/quiz.html")]
pub struct QuizTemplate {
  pub chapter_title: String,
  pub chapter_url: String,
  pub test_title: String,
  pub test_description: String,
  pub test_slug: String,
  pub submit_url: String,
  pub questions: Vec<QuestionView>,
}

pub struct AnswerView {
  pub number: usize,
  pub prompt: String,
  pub given: String,
  pub expected: String,
  pub correct: bool,
}

#[derive(Template)]
#[template(path = "chapters/quiz_result.html")]
pub struct QuizResultTemplate {
  pub chapter_title: String,
  pub chapter_url: String,
  pub test_title: String,
  pub retry_url: String,
  pub correct: usize,
  pub total: usize,
  pub passed: bool,
  pub answers: Vec<AnswerView>,
}

/// Query string accepted by the chapter view
#[derive(Debug, Default, Deserialize)]
pub struct StudyQuery {
  pub restart: Option<String>,
  /// Informational only
  pub pos: Option<String>,
  pub show_test: Option<String>,
}

impl StudyQuery {
  pub fn wants_restart(&self) -> bool {
    self.restart.as_deref() == Some("1")
  }
}

#[derive(Debug, Deserialize)]
pub struct StudyForm {
  pub action: Option<String>,
  pub mark_as: Option<String>,
}

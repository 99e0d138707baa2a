//! Template and form structs for the admin screens.

use askama::Template;
use serde::Deserialize;

use crate::domain::{Category, Flashcard, MarkAs};
use crate::handlers::templates::MarkOption;

/// One `<option>` of a select box
pub struct SelectOption {
  pub value: String,
  pub label: String,
  pub selected: bool,
}

impl SelectOption {
  pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
    Self {
      value: value.into(),
      label: label.into(),
      selected,
    }
  }

  /// Category choices, with `selected` preselected
  pub fn categories(selected: Option<Category>) -> Vec<Self> {
    Category::ALL
      .iter()
      .map(|c| Self::new(c.as_str(), c.label(), Some(*c) == selected))
      .collect()
  }

  /// Flashcards for a multi-select, in default order
  pub fn cards(cards: &[Flashcard], selected: &[i64]) -> Vec<Self> {
    cards
      .iter()
      .map(|c| Self::new(c.id.to_string(), c.display_name(), selected.contains(&c.id)))
      .collect()
  }
}

#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
  pub username: String,
  pub chapter_count: i64,
  pub flashcard_count: i64,
  pub test_count: i64,
}

// ==================== Chapters ====================

pub struct ChapterAdminRow {
  pub title: String,
  pub slug: String,
  pub edit_url: String,
  pub public_url: String,
}

#[derive(Template)]
#[template(path = "admin/chapter_list.html")]
pub struct ChapterAdminListTemplate {
  pub username: String,
  pub query: String,
  pub chapters: Vec<ChapterAdminRow>,
}

#[derive(Template)]
#[template(path = "admin/chapter_form.html")]
pub struct ChapterFormTemplate {
  pub username: String,
  pub heading: String,
  pub action_url: String,
  /// Set when editing an existing chapter
  pub delete_url: Option<String>,
  pub title: String,
  pub description: String,
  pub slug: String,
  pub cards: Vec<SelectOption>,
  pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChapterForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub slug: String,
  /// Repeated `cards` fields from the multi-select
  #[serde(default)]
  pub cards: Vec<i64>,
}

// ==================== Flashcards ====================

pub struct FlashcardAdminRow {
  pub id: i64,
  pub category_label: &'static str,
  pub word_english: String,
  pub word_spanish: String,
  pub mean_english: String,
  pub mean_espanish: String,
  pub viewed: bool,
  pub mark_options: Vec<MarkOption>,
  pub edit_url: String,
  pub status_url: String,
}

impl From<&Flashcard> for FlashcardAdminRow {
  fn from(card: &Flashcard) -> Self {
    Self {
      id: card.id,
      category_label: card.category.label(),
      word_english: card.word_english.clone(),
      word_spanish: card.word_spanish.clone(),
      mean_english: card.mean_english.clone(),
      mean_espanish: card.mean_espanish.clone(),
      viewed: card.viewed,
      mark_options: MarkOption::all(card.mark_as),
      edit_url: format!("/admin/flashcards/{}/edit", card.id),
      status_url: format!("/admin/flashcards/{}/status", card.id),
    }
  }
}

#[derive(Template)]
#[template(path = "admin/flashcard_list.html")]
pub struct FlashcardAdminListTemplate {
  pub username: String,
  pub query: String,
  pub category_filter: Vec<SelectOption>,
  pub viewed_filter: Vec<SelectOption>,
  pub mark_filter: Vec<SelectOption>,
  pub rows: Vec<FlashcardAdminRow>,
  /// Current list URL (with filters), so inline edits return to the same view
  pub back_url: String,
}

#[derive(Template)]
#[template(path = "admin/flashcard_form.html")]
pub struct FlashcardFormTemplate {
  pub username: String,
  pub heading: String,
  pub action_url: String,
  pub delete_url: Option<String>,
  /// Read-only id when editing
  pub id: Option<i64>,
  pub categories: Vec<SelectOption>,
  pub word_english: String,
  pub word_spanish: String,
  pub ipa_english: String,
  pub ipa_spanish: String,
  /// Public URLs of the currently stored audio files
  pub audio_english_url: Option<String>,
  pub audio_spanish_url: Option<String>,
  pub content: String,
  pub mean_english: String,
  pub mean_espanish: String,
  pub image_url: String,
  pub viewed: bool,
  pub mark_options: Vec<MarkOption>,
  pub slug: String,
  pub errors: Vec<String>,
}

/// List filters; empty strings mean "any"
#[derive(Debug, Default, Deserialize)]
pub struct FlashcardListQuery {
  #[serde(default)]
  pub q: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub viewed: String,
  #[serde(default)]
  pub mark_as: String,
}

/// Inline status edit from the list
#[derive(Debug, Deserialize)]
pub struct StatusForm {
  /// Checkbox: present when checked
  pub viewed: Option<String>,
  pub mark_as: String,
  pub back: Option<String>,
}

// ==================== Tests ====================

pub struct TestAdminRow {
  pub title: String,
  pub num_questions: u32,
  pub edit_url: String,
}

#[derive(Template)]
#[template(path = "admin/test_list.html")]
pub struct TestAdminListTemplate {
  pub username: String,
  pub tests: Vec<TestAdminRow>,
}

#[derive(Template)]
#[template(path = "admin/test_form.html")]
pub struct TestFormTemplate {
  pub username: String,
  pub heading: String,
  pub action_url: String,
  pub delete_url: Option<String>,
  pub title: String,
  pub description: String,
  pub slug: String,
  pub num_questions: String,
  pub questions: Vec<SelectOption>,
  pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub slug: String,
  /// Kept as text so a bad number re-renders the form instead of rejecting the request
  #[serde(default)]
  pub num_questions: String,
  #[serde(default)]
  pub questions: Vec<i64>,
}

/// `viewed` tri-state filter from the list query
pub fn parse_viewed_filter(value: &str) -> Option<bool> {
  match value {
    "1" | "true" | "yes" => Some(true),
    "0" | "false" | "no" => Some(false),
    _ => None,
  }
}

/// Filter choices for `viewed` (any / yes / no)
pub fn viewed_options(selected: Option<bool>) -> Vec<SelectOption> {
  vec![
    SelectOption::new("", "Any", selected.is_none()),
    SelectOption::new("1", "Yes", selected == Some(true)),
    SelectOption::new("0", "No", selected == Some(false)),
  ]
}

/// Filter choices for `mark_as`, with an "any" entry
pub fn mark_filter_options(selected: Option<MarkAs>) -> Vec<SelectOption> {
  let mut options = vec![SelectOption::new("", "Any", selected.is_none())];
  options.extend(
    MarkAs::ALL
      .iter()
      .map(|m| SelectOption::new(m.as_str(), m.label(), Some(*m) == selected)),
  );
  options
}

/// Filter choices for category, with an "any" entry
pub fn category_filter_options(selected: Option<Category>) -> Vec<SelectOption> {
  let mut options = vec![SelectOption::new("", "Any", selected.is_none())];
  options.extend(SelectOption::categories(selected));
  options
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_viewed_filter() {
    assert_eq!(parse_viewed_filter("1"), Some(true));
    assert_eq!(parse_viewed_filter("0"), Some(false));
    assert_eq!(parse_viewed_filter(""), None);
    assert_eq!(parse_viewed_filter("maybe"), None);
  }

  #[test]
  fn test_filter_options_mark_selection() {
    let options = mark_filter_options(Some(MarkAs::Learned));
    let selected: Vec<&str> = options
      .iter()
      .filter(|o| o.selected)
      .map(|o| o.value.as_str())
      .collect();
    assert_eq!(selected, vec!["learned"]);

    let options = category_filter_options(None);
    assert_eq!(options.len(), Category::ALL.len() + 1);
    assert!(options[0].selected);
  }

  #[test]
  fn test_admin_pages_render_inside_site_layout() {
    let index = AdminIndexTemplate {
      username: "admin".to_string(),
      chapter_count: 2,
      flashcard_count: 5,
      test_count: 1,
    }
    .render()
    .unwrap();
    assert!(index.contains("<title>Admin - Vocab Notebook</title>"));
    assert!(index.contains(r#"href="/static/css/styles.css""#));
    assert!(index.contains(r#"action="/admin/logout""#));

    let form = TestFormTemplate {
      username: "admin".to_string(),
      heading: "Add test".to_string(),
      action_url: "/admin/tests/new".to_string(),
      delete_url: None,
      title: String::new(),
      description: String::new(),
      slug: String::new(),
      num_questions: "3".to_string(),
      questions: Vec::new(),
      errors: vec!["Title is required".to_string()],
    }
    .render()
    .unwrap();
    assert!(form.contains(r#"action="/admin/logout""#));
    assert!(form.contains("<li>Title is required</li>"));
  }
}

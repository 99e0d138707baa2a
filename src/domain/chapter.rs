use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// A named grouping of flashcards studied together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub slug: String,
}

impl Chapter {
  pub fn url(&self) -> String {
    chapter_url(&self.slug)
  }
}

/// Chapter listing row with its derived completion flag
#[derive(Debug, Clone)]
pub struct ChapterOverview {
  pub chapter: Chapter,
  pub total_cards: i64,
  /// True iff no associated card is still unviewed
  pub finished: bool,
}

/// Per-status counts shown once a chapter has been worked through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterStats {
  pub total: i64,
  pub learned: i64,
  pub review: i64,
}

/// Editable chapter fields, as submitted from the admin form
#[derive(Debug, Clone, Default)]
pub struct ChapterDraft {
  pub title: String,
  pub description: String,
  /// Blank means "derive from title"
  pub slug: String,
  pub card_ids: Vec<i64>,
}

impl ChapterDraft {
  pub fn resolved_slug(&self) -> String {
    let submitted = self.slug.trim();
    if submitted.is_empty() {
      slugify(&self.title)
    } else {
      submitted.to_string()
    }
  }

  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();
    if self.title.trim().is_empty() {
      errors.push("Title is required".to_string());
    } else if self.title.chars().count() > 200 {
      errors.push("Title must be at most 200 characters".to_string());
    }
    errors
  }
}

/// Public study URL for a chapter slug
pub fn chapter_url(slug: &str) -> String {
  format!("/capitulos/{}/", slug)
}

//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry their
//! own copy of the table definitions.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

use crate::db;
use crate::domain::{Category, ChapterDraft, FlashcardDraft};

/// Test environment with a migrated database in a temporary directory.
pub struct TestEnv {
  /// Temporary directory (kept alive for database file persistence)
  pub temp: TempDir,
  /// Connection with the full schema (all migrations)
  pub conn: Connection,
}

impl TestEnv {
  pub fn new() -> rusqlite::Result<Self> {
    let temp =
      TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let conn = db::open_connection(&temp.path().join("vocab.db"))?;
    db::run_migrations(&conn)?;

    Ok(Self { temp, conn })
  }

  /// Get the temporary directory path for creating test files.
  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Insert a chapter holding the given cards and return its id
  pub fn chapter_with(&self, title: &str, card_ids: &[i64]) -> i64 {
    db::insert_chapter(
      &self.conn,
      &ChapterDraft {
        title: title.to_string(),
        card_ids: card_ids.to_vec(),
        ..Default::default()
      },
    )
    .expect("insert chapter")
  }

  /// Insert a card with the given words and return its id
  pub fn card(&self, category: Category, english: &str, spanish: &str) -> i64 {
    db::insert_flashcard(&self.conn, &sample_card(category, english, spanish)).expect("insert card")
  }
}

/// Minimal valid flashcard draft
pub fn sample_card(category: Category, english: &str, spanish: &str) -> FlashcardDraft {
  FlashcardDraft {
    category,
    word_english: english.to_string(),
    word_spanish: spanish.to_string(),
    mean_english: format!("meaning of {}", english),
    mean_espanish: format!("significado de {}", spanish),
    ..Default::default()
  }
}

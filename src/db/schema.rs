//! Schema creation with version-gated migrations.
//!
//! Each migration checks the recorded schema version, runs once, and records
//! the new version in `db_version`. New databases walk every migration in order.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Current schema version. Increment when adding a migration.
pub const SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS db_version (
      version INTEGER PRIMARY KEY,
      applied_at TEXT NOT NULL,
      description TEXT
    );
    "#,
  )?;

  let current_version = get_schema_version(conn)?;
  tracing::debug!("schema version: {}", current_version);

  if current_version < 1 {
    migrate_v0_to_v1(conn)?;
  }
  if current_version < 2 {
    migrate_v1_to_v2(conn)?;
  }

  Ok(())
}

/// v0→v1: content tables (chapters, flashcards, tests and their join tables)
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v0→v1: Create content tables");

  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      category TEXT NOT NULL DEFAULT 'word',
      word_english TEXT NOT NULL,
      word_spanish TEXT NOT NULL,
      ipa_english TEXT NOT NULL DEFAULT '',
      ipa_spanish TEXT NOT NULL DEFAULT '',
      audio_english TEXT,
      audio_spanish TEXT,
      content TEXT NOT NULL DEFAULT '',
      mean_english TEXT NOT NULL DEFAULT '',
      mean_espanish TEXT NOT NULL DEFAULT '',
      image_url TEXT,
      viewed INTEGER NOT NULL DEFAULT 0,
      mark_as TEXT NOT NULL DEFAULT 'review',
      slug TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS chapters (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      description TEXT NOT NULL DEFAULT '',
      slug TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS chapter_cards (
      chapter_id INTEGER NOT NULL,
      flashcard_id INTEGER NOT NULL,
      PRIMARY KEY (chapter_id, flashcard_id),
      FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE,
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS tests (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      description TEXT NOT NULL DEFAULT '',
      slug TEXT NOT NULL UNIQUE,
      num_questions INTEGER NOT NULL DEFAULT 3 CHECK (num_questions >= 0)
    );

    CREATE TABLE IF NOT EXISTS test_questions (
      test_id INTEGER NOT NULL,
      flashcard_id INTEGER NOT NULL,
      PRIMARY KEY (test_id, flashcard_id),
      FOREIGN KEY (test_id) REFERENCES tests(id) ON DELETE CASCADE,
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_flashcards_order ON flashcards(category, word_english);
    CREATE INDEX IF NOT EXISTS idx_chapters_title ON chapters(title);
    CREATE INDEX IF NOT EXISTS idx_chapter_cards_flashcard ON chapter_cards(flashcard_id);
    CREATE INDEX IF NOT EXISTS idx_test_questions_flashcard ON test_questions(flashcard_id);
    "#,
  )?;

  record_version(conn, 1, "Create content tables")?;
  Ok(())
}

/// v1→v2: admin accounts for the record-management screens
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v1→v2: Create admin_users");

  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS admin_users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      username TEXT NOT NULL UNIQUE COLLATE NOCASE,
      password_hash TEXT NOT NULL,
      created_at TEXT NOT NULL
    );
    "#,
  )?;
  add_column_if_missing(conn, "admin_users", "last_login_at", "TEXT")?;

  record_version(conn, 2, "Create admin_users")?;
  Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
  conn.query_row(
    "SELECT COALESCE(MAX(version), 0) FROM db_version",
    [],
    |row| row.get(0),
  )
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
    params![version, Utc::now().to_rfc3339(), description],
  )?;
  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

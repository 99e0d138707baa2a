use rusqlite::{params, Connection, OptionalExtension, Result};

use super::flashcards::{row_to_flashcard, FLASHCARD_COLUMNS, FLASHCARD_ORDER};
use crate::domain::{Chapter, ChapterDraft, ChapterOverview, ChapterStats, Flashcard};

/// All chapters ordered by title, each with its derived `finished` flag
pub fn list_chapters(conn: &Connection) -> Result<Vec<ChapterOverview>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT c.id, c.title, c.description, c.slug, COUNT(cc.flashcard_id) AS total
    FROM chapters c
    LEFT JOIN chapter_cards cc ON cc.chapter_id = c.id
    GROUP BY c.id
    ORDER BY c.title ASC, c.id ASC
    "#,
  )?;

  let rows = stmt
    .query_map([], |row| Ok((row_to_chapter(row)?, row.get::<_, i64>(4)?)))?
    .collect::<Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(chapter, total_cards)| {
      Ok(ChapterOverview {
        finished: is_chapter_finished(conn, chapter.id)?,
        chapter,
        total_cards,
      })
    })
    .collect()
}

/// Chapters whose title or slug contains `query` (all when blank), ordered by title
pub fn search_chapters(conn: &Connection, query: Option<&str>) -> Result<Vec<Chapter>> {
  let pattern = super::like_pattern(query).unwrap_or_else(|| "%".to_string());
  let mut stmt = conn.prepare(
    r#"
    SELECT id, title, description, slug
    FROM chapters
    WHERE title LIKE ?1 OR slug LIKE ?1
    ORDER BY title ASC, id ASC
    "#,
  )?;
  let chapters = stmt
    .query_map(params![pattern], row_to_chapter)?
    .collect::<Result<Vec<_>>>()?;
  Ok(chapters)
}

pub fn get_chapter_by_slug(conn: &Connection, slug: &str) -> Result<Option<Chapter>> {
  conn
    .query_row(
      "SELECT id, title, description, slug FROM chapters WHERE slug = ?1",
      params![slug],
      row_to_chapter,
    )
    .optional()
}

pub fn get_chapter(conn: &Connection, id: i64) -> Result<Option<Chapter>> {
  conn
    .query_row(
      "SELECT id, title, description, slug FROM chapters WHERE id = ?1",
      params![id],
      row_to_chapter,
    )
    .optional()
}

/// Insert a chapter with its card selection; the slug is derived from the title when blank
pub fn insert_chapter(conn: &Connection, draft: &ChapterDraft) -> Result<i64> {
  let tx = conn.unchecked_transaction()?;
  tx.execute(
    "INSERT INTO chapters (title, description, slug) VALUES (?1, ?2, ?3)",
    params![draft.title.trim(), draft.description, draft.resolved_slug()],
  )?;
  let id = tx.last_insert_rowid();
  set_chapter_cards(&tx, id, &draft.card_ids)?;
  tx.commit()?;
  Ok(id)
}

pub fn update_chapter(conn: &Connection, id: i64, draft: &ChapterDraft) -> Result<()> {
  let tx = conn.unchecked_transaction()?;
  tx.execute(
    "UPDATE chapters SET title = ?1, description = ?2, slug = ?3 WHERE id = ?4",
    params![draft.title.trim(), draft.description, draft.resolved_slug(), id],
  )?;
  set_chapter_cards(&tx, id, &draft.card_ids)?;
  tx.commit()?;
  Ok(())
}

pub fn delete_chapter(conn: &Connection, id: i64) -> Result<bool> {
  let deleted = conn.execute("DELETE FROM chapters WHERE id = ?1", params![id])?;
  Ok(deleted > 0)
}

/// Replace the chapter's card selection. Ids that do not exist are skipped.
fn set_chapter_cards(conn: &Connection, chapter_id: i64, card_ids: &[i64]) -> Result<()> {
  conn.execute(
    "DELETE FROM chapter_cards WHERE chapter_id = ?1",
    params![chapter_id],
  )?;
  let mut stmt = conn.prepare(
    "INSERT OR IGNORE INTO chapter_cards (chapter_id, flashcard_id) SELECT ?1, id FROM flashcards WHERE id = ?2",
  )?;
  for card_id in card_ids {
    stmt.execute(params![chapter_id, card_id])?;
  }
  Ok(())
}

/// The chapter's cards in default flashcard order (the order they are studied in)
pub fn chapter_cards(conn: &Connection, chapter_id: i64) -> Result<Vec<Flashcard>> {
  let mut stmt = conn.prepare(&format!(
    r#"
    SELECT {}
    FROM flashcards f
    JOIN chapter_cards cc ON cc.flashcard_id = f.id
    WHERE cc.chapter_id = ?1
    ORDER BY {}
    "#,
    FLASHCARD_COLUMNS, FLASHCARD_ORDER
  ))?;
  let cards = stmt
    .query_map(params![chapter_id], row_to_flashcard)?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub fn chapter_card_ids(conn: &Connection, chapter_id: i64) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare("SELECT flashcard_id FROM chapter_cards WHERE chapter_id = ?1")?;
  let ids = stmt
    .query_map(params![chapter_id], |row| row.get(0))?
    .collect::<Result<Vec<_>>>()?;
  Ok(ids)
}

/// True iff no card of the chapter is still unviewed
pub fn is_chapter_finished(conn: &Connection, chapter_id: i64) -> Result<bool> {
  conn.query_row(
    r#"
    SELECT NOT EXISTS(
      SELECT 1 FROM chapter_cards cc
      JOIN flashcards f ON f.id = cc.flashcard_id
      WHERE cc.chapter_id = ?1 AND f.viewed = 0
    )
    "#,
    params![chapter_id],
    |row| row.get(0),
  )
}

/// Mark every card of the chapter as unviewed, leaving statuses alone.
/// Returns the number of cards touched.
pub fn reset_chapter_progress(conn: &Connection, chapter_id: i64) -> Result<usize> {
  conn.execute(
    r#"
    UPDATE flashcards SET viewed = 0
    WHERE id IN (SELECT flashcard_id FROM chapter_cards WHERE chapter_id = ?1)
    "#,
    params![chapter_id],
  )
}

/// Total / learned / review counts across the chapter's cards
pub fn chapter_stats(conn: &Connection, chapter_id: i64) -> Result<ChapterStats> {
  conn.query_row(
    r#"
    SELECT COUNT(f.id),
           COALESCE(SUM(CASE WHEN f.mark_as = 'learned' THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN f.mark_as = 'review' THEN 1 ELSE 0 END), 0)
    FROM chapter_cards cc
    JOIN flashcards f ON f.id = cc.flashcard_id
    WHERE cc.chapter_id = ?1
    "#,
    params![chapter_id],
    |row| {
      Ok(ChapterStats {
        total: row.get(0)?,
        learned: row.get(1)?,
        review: row.get(2)?,
      })
    },
  )
}

pub fn chapter_slug_taken(conn: &Connection, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
  super::slug_taken(conn, "chapters", slug, exclude_id)
}

pub fn count_chapters(conn: &Connection) -> Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM chapters", [], |row| row.get(0))
}

fn row_to_chapter(row: &rusqlite::Row) -> Result<Chapter> {
  Ok(Chapter {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    slug: row.get(3)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{delete_flashcard, get_flashcard, mark_flashcard};
  use crate::domain::{Category, MarkAs};
  use crate::testing::TestEnv;

  #[test]
  fn test_insert_derives_slug_from_title() {
    let env = TestEnv::new().unwrap();
    let id = env.chapter_with("Unidad Uno: Verbos", &[]);

    let chapter = get_chapter(&env.conn, id).unwrap().unwrap();
    assert_eq!(chapter.slug, "unidad-uno-verbos");
    assert_eq!(
      get_chapter_by_slug(&env.conn, "unidad-uno-verbos").unwrap().unwrap().id,
      id
    );
  }

  #[test]
  fn test_slug_stable_when_title_changes() {
    let env = TestEnv::new().unwrap();
    let id = env.chapter_with("Basics", &[]);
    let chapter = get_chapter(&env.conn, id).unwrap().unwrap();

    update_chapter(
      &env.conn,
      id,
      &ChapterDraft {
        title: "Advanced".to_string(),
        slug: chapter.slug.clone(),
        ..Default::default()
      },
    )
    .unwrap();

    let updated = get_chapter(&env.conn, id).unwrap().unwrap();
    assert_eq!(updated.title, "Advanced");
    assert_eq!(updated.slug, "basics");
  }

  #[test]
  fn test_list_ordered_by_title_with_finished_flag() {
    let env = TestEnv::new().unwrap();
    let run = env.card(Category::Verb, "run", "correr");
    let eat = env.card(Category::Verb, "eat", "comer");
    env.chapter_with("Zeta", &[run]);
    env.chapter_with("Alpha", &[run, eat]);
    env.chapter_with("Empty", &[]);

    mark_flashcard(&env.conn, run, MarkAs::Review).unwrap();

    let chapters = list_chapters(&env.conn).unwrap();
    let titles: Vec<&str> = chapters.iter().map(|c| c.chapter.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Empty", "Zeta"]);

    // Alpha still has "eat" unviewed
    assert!(!chapters[0].finished);
    assert_eq!(chapters[0].total_cards, 2);
    // No cards means nothing left to view
    assert!(chapters[1].finished);
    assert!(chapters[2].finished);
  }

  #[test]
  fn test_finished_iff_all_cards_viewed() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let b = env.card(Category::Word, "bread", "pan");
    let chapter = env.chapter_with("Food", &[a, b]);

    assert!(!is_chapter_finished(&env.conn, chapter).unwrap());
    mark_flashcard(&env.conn, a, MarkAs::Learned).unwrap();
    assert!(!is_chapter_finished(&env.conn, chapter).unwrap());
    mark_flashcard(&env.conn, b, MarkAs::Review).unwrap();
    assert!(is_chapter_finished(&env.conn, chapter).unwrap());
  }

  #[test]
  fn test_list_flag_matches_finished_rule() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let chapter = env.chapter_with("Food", &[a]);

    mark_flashcard(&env.conn, a, MarkAs::Learned).unwrap();
    assert!(list_chapters(&env.conn).unwrap()[0].finished);
    assert!(is_chapter_finished(&env.conn, chapter).unwrap());

    reset_chapter_progress(&env.conn, chapter).unwrap();
    assert!(!list_chapters(&env.conn).unwrap()[0].finished);
    assert!(!is_chapter_finished(&env.conn, chapter).unwrap());
  }

  #[test]
  fn test_chapter_cards_in_default_order() {
    let env = TestEnv::new().unwrap();
    let walk = env.card(Category::Verb, "walk", "caminar");
    let apple = env.card(Category::Word, "apple", "manzana");
    let eat = env.card(Category::Verb, "eat", "comer");
    let unrelated = env.card(Category::Verb, "sleep", "dormir");
    let chapter = env.chapter_with("Mixed", &[walk, apple, eat]);

    let words: Vec<String> = chapter_cards(&env.conn, chapter)
      .unwrap()
      .into_iter()
      .map(|c| c.word_english)
      .collect();
    assert_eq!(words, vec!["eat", "walk", "apple"]);

    let mut ids = chapter_card_ids(&env.conn, chapter).unwrap();
    ids.sort();
    assert!(!ids.contains(&unrelated));
    assert_eq!(ids.len(), 3);
  }

  #[test]
  fn test_card_in_multiple_chapters() {
    let env = TestEnv::new().unwrap();
    let run = env.card(Category::Verb, "run", "correr");
    let first = env.chapter_with("First", &[run]);
    let second = env.chapter_with("Second", &[run]);

    assert_eq!(chapter_cards(&env.conn, first).unwrap().len(), 1);
    assert_eq!(chapter_cards(&env.conn, second).unwrap().len(), 1);
  }

  #[test]
  fn test_unknown_card_ids_are_skipped() {
    let env = TestEnv::new().unwrap();
    let run = env.card(Category::Verb, "run", "correr");
    let chapter = env.chapter_with("First", &[run, 4242]);
    assert_eq!(chapter_card_ids(&env.conn, chapter).unwrap(), vec![run]);
  }

  #[test]
  fn test_reset_progress_keeps_status() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let b = env.card(Category::Word, "bread", "pan");
    let outside = env.card(Category::Word, "cheese", "queso");
    let chapter = env.chapter_with("Food", &[a, b]);
    mark_flashcard(&env.conn, a, MarkAs::Learned).unwrap();
    mark_flashcard(&env.conn, b, MarkAs::Review).unwrap();
    mark_flashcard(&env.conn, outside, MarkAs::Learned).unwrap();

    assert_eq!(reset_chapter_progress(&env.conn, chapter).unwrap(), 2);

    let apple = get_flashcard(&env.conn, a).unwrap().unwrap();
    assert!(!apple.viewed);
    assert_eq!(apple.mark_as, MarkAs::Learned);
    assert!(!get_flashcard(&env.conn, b).unwrap().unwrap().viewed);
    // Cards outside the chapter are untouched
    assert!(get_flashcard(&env.conn, outside).unwrap().unwrap().viewed);
    assert!(!is_chapter_finished(&env.conn, chapter).unwrap());
  }

  #[test]
  fn test_chapter_stats() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let b = env.card(Category::Word, "bread", "pan");
    let c = env.card(Category::Word, "cheese", "queso");
    let chapter = env.chapter_with("Food", &[a, b, c]);
    mark_flashcard(&env.conn, a, MarkAs::Learned).unwrap();
    mark_flashcard(&env.conn, b, MarkAs::Learned).unwrap();

    assert_eq!(
      chapter_stats(&env.conn, chapter).unwrap(),
      ChapterStats {
        total: 3,
        learned: 2,
        review: 1
      }
    );

    let empty = env.chapter_with("Empty", &[]);
    assert_eq!(chapter_stats(&env.conn, empty).unwrap(), ChapterStats::default());
  }

  #[test]
  fn test_deleting_card_removes_membership() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let chapter = env.chapter_with("Food", &[a]);
    delete_flashcard(&env.conn, a).unwrap();
    assert!(chapter_cards(&env.conn, chapter).unwrap().is_empty());
  }

  #[test]
  fn test_delete_chapter_keeps_cards() {
    let env = TestEnv::new().unwrap();
    let a = env.card(Category::Word, "apple", "manzana");
    let chapter = env.chapter_with("Food", &[a]);
    assert!(delete_chapter(&env.conn, chapter).unwrap());
    assert!(get_chapter(&env.conn, chapter).unwrap().is_none());
    assert!(get_flashcard(&env.conn, a).unwrap().is_some());
    assert_eq!(count_chapters(&env.conn).unwrap(), 0);
  }

  #[test]
  fn test_search_chapters() {
    let env = TestEnv::new().unwrap();
    env.chapter_with("Food", &[]);
    env.chapter_with("Travel", &[]);
    assert_eq!(search_chapters(&env.conn, Some("trav")).unwrap().len(), 1);
    assert_eq!(search_chapters(&env.conn, None).unwrap().len(), 2);
    assert!(chapter_slug_taken(&env.conn, "food", None).unwrap());
  }
}

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result};

use crate::domain::{Category, Flashcard, FlashcardDraft, MarkAs};

/// Column list for flashcard queries, aliased as `f`
pub(crate) const FLASHCARD_COLUMNS: &str = "f.id, f.category, f.word_english, f.word_spanish, \
  f.ipa_english, f.ipa_spanish, f.audio_english, f.audio_spanish, f.content, f.mean_english, \
  f.mean_espanish, f.image_url, f.viewed, f.mark_as, f.slug";

/// Default flashcard ordering: category, then English word
pub(crate) const FLASHCARD_ORDER: &str = "f.category ASC, f.word_english ASC, f.id ASC";

pub fn insert_flashcard(conn: &Connection, draft: &FlashcardDraft) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO flashcards (category, word_english, word_spanish, ipa_english, ipa_spanish,
                            audio_english, audio_spanish, content, mean_english, mean_espanish,
                            image_url, viewed, mark_as, slug)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
    "#,
    params![
      draft.category.as_str(),
      draft.word_english.trim(),
      draft.word_spanish.trim(),
      draft.ipa_english,
      draft.ipa_spanish,
      draft.audio_english,
      draft.audio_spanish,
      draft.content,
      draft.mean_english,
      draft.mean_espanish,
      draft.image_url,
      draft.viewed,
      draft.mark_as.as_str(),
      draft.resolved_slug(),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_flashcard(conn: &Connection, id: i64, draft: &FlashcardDraft) -> Result<()> {
  conn.execute(
    r#"
    UPDATE flashcards
    SET category = ?1, word_english = ?2, word_spanish = ?3, ipa_english = ?4, ipa_spanish = ?5,
        audio_english = ?6, audio_spanish = ?7, content = ?8, mean_english = ?9,
        mean_espanish = ?10, image_url = ?11, viewed = ?12, mark_as = ?13, slug = ?14
    WHERE id = ?15
    "#,
    params![
      draft.category.as_str(),
      draft.word_english.trim(),
      draft.word_spanish.trim(),
      draft.ipa_english,
      draft.ipa_spanish,
      draft.audio_english,
      draft.audio_spanish,
      draft.content,
      draft.mean_english,
      draft.mean_espanish,
      draft.image_url,
      draft.viewed,
      draft.mark_as.as_str(),
      draft.resolved_slug(),
      id,
    ],
  )?;
  Ok(())
}

pub fn get_flashcard(conn: &Connection, id: i64) -> Result<Option<Flashcard>> {
  conn
    .query_row(
      &format!("SELECT {} FROM flashcards f WHERE f.id = ?1", FLASHCARD_COLUMNS),
      params![id],
      row_to_flashcard,
    )
    .optional()
}

/// Delete a card (and its chapter/test memberships). Returns false if it did not exist.
pub fn delete_flashcard(conn: &Connection, id: i64) -> Result<bool> {
  let deleted = conn.execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
  Ok(deleted > 0)
}

/// Record a study mark: the card becomes viewed and takes the submitted status
pub fn mark_flashcard(conn: &Connection, id: i64, mark_as: MarkAs) -> Result<()> {
  conn.execute(
    "UPDATE flashcards SET viewed = 1, mark_as = ?1 WHERE id = ?2",
    params![mark_as.as_str(), id],
  )?;
  Ok(())
}

/// Set both study fields directly (admin list inline editing)
pub fn set_flashcard_status(conn: &Connection, id: i64, viewed: bool, mark_as: MarkAs) -> Result<bool> {
  let updated = conn.execute(
    "UPDATE flashcards SET viewed = ?1, mark_as = ?2 WHERE id = ?3",
    params![viewed, mark_as.as_str(), id],
  )?;
  Ok(updated > 0)
}

pub fn flashcard_slug_taken(conn: &Connection, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
  super::slug_taken(conn, "flashcards", slug, exclude_id)
}

pub fn count_flashcards(conn: &Connection) -> Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))
}

/// Admin list filters; `None` means "any"
#[derive(Debug, Clone, Default)]
pub struct FlashcardFilter {
  /// Matches English word, Spanish word or category
  pub query: Option<String>,
  pub category: Option<Category>,
  pub viewed: Option<bool>,
  pub mark_as: Option<MarkAs>,
}

/// All flashcards matching `filter`, in default order
pub fn list_flashcards(conn: &Connection, filter: &FlashcardFilter) -> Result<Vec<Flashcard>> {
  let mut clauses: Vec<String> = Vec::new();
  let mut values: Vec<Value> = Vec::new();

  if let Some(pattern) = super::like_pattern(filter.query.as_deref()) {
    values.push(Value::Text(pattern));
    let n = values.len();
    clauses.push(format!(
      "(f.word_english LIKE ?{n} OR f.word_spanish LIKE ?{n} OR f.category LIKE ?{n})"
    ));
  }
  if let Some(category) = filter.category {
    values.push(Value::Text(category.as_str().to_string()));
    clauses.push(format!("f.category = ?{}", values.len()));
  }
  if let Some(viewed) = filter.viewed {
    values.push(Value::Integer(viewed as i64));
    clauses.push(format!("f.viewed = ?{}", values.len()));
  }
  if let Some(mark_as) = filter.mark_as {
    values.push(Value::Text(mark_as.as_str().to_string()));
    clauses.push(format!("f.mark_as = ?{}", values.len()));
  }

  let where_clause = if clauses.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", clauses.join(" AND "))
  };

  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM flashcards f {} ORDER BY {}",
    FLASHCARD_COLUMNS, where_clause, FLASHCARD_ORDER
  ))?;
  let cards = stmt
    .query_map(params_from_iter(values.iter()), row_to_flashcard)?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub(crate) fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
  let category_str: String = row.get(1)?;
  let mark_as_str: String = row.get(13)?;

  Ok(Flashcard {
    id: row.get(0)?,
    category: Category::from_str(&category_str).unwrap_or_default(),
    word_english: row.get(2)?,
    word_spanish: row.get(3)?,
    ipa_english: row.get(4)?,
    ipa_spanish: row.get(5)?,
    audio_english: row.get(6)?,
    audio_spanish: row.get(7)?,
    content: row.get(8)?,
    mean_english: row.get(9)?,
    mean_espanish: row.get(10)?,
    image_url: row.get(11)?,
    viewed: row.get(12)?,
    mark_as: MarkAs::from_str(&mark_as_str).unwrap_or_default(),
    slug: row.get(14)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{sample_card, TestEnv};

  #[test]
  fn test_insert_and_get() {
    let env = TestEnv::new().unwrap();
    let id = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();

    let card = get_flashcard(&env.conn, id).unwrap().unwrap();
    assert_eq!(card.word_english, "run");
    assert_eq!(card.word_spanish, "correr");
    assert_eq!(card.category, Category::Verb);
    assert_eq!(card.slug, "verb-run");
    assert!(!card.viewed);
    assert_eq!(card.mark_as, MarkAs::Review);
  }

  #[test]
  fn test_get_missing_returns_none() {
    let env = TestEnv::new().unwrap();
    assert!(get_flashcard(&env.conn, 999).unwrap().is_none());
  }

  #[test]
  fn test_slug_stable_across_updates() {
    let env = TestEnv::new().unwrap();
    let mut draft = sample_card(Category::Word, "house", "casa");
    let id = insert_flashcard(&env.conn, &draft).unwrap();
    let original = get_flashcard(&env.conn, id).unwrap().unwrap().slug;

    // Re-save with the stored slug and a changed word: slug must not follow the word
    draft.slug = original.clone();
    draft.word_english = "home".to_string();
    update_flashcard(&env.conn, id, &draft).unwrap();

    let card = get_flashcard(&env.conn, id).unwrap().unwrap();
    assert_eq!(card.word_english, "home");
    assert_eq!(card.slug, original);
    assert_eq!(card.slug, "word-house");
  }

  #[test]
  fn test_duplicate_slug_detected() {
    let env = TestEnv::new().unwrap();
    let id = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();

    assert!(flashcard_slug_taken(&env.conn, "verb-run", None).unwrap());
    assert!(!flashcard_slug_taken(&env.conn, "verb-run", Some(id)).unwrap());
    assert!(!flashcard_slug_taken(&env.conn, "verb-walk", None).unwrap());

    // The UNIQUE constraint backs the check up
    assert!(insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "huir")).is_err());
  }

  #[test]
  fn test_mark_flashcard_sets_viewed_and_status() {
    let env = TestEnv::new().unwrap();
    let id = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();

    mark_flashcard(&env.conn, id, MarkAs::Learned).unwrap();

    let card = get_flashcard(&env.conn, id).unwrap().unwrap();
    assert!(card.viewed);
    assert_eq!(card.mark_as, MarkAs::Learned);
  }

  #[test]
  fn test_set_flashcard_status() {
    let env = TestEnv::new().unwrap();
    let id = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();
    mark_flashcard(&env.conn, id, MarkAs::Learned).unwrap();

    assert!(set_flashcard_status(&env.conn, id, false, MarkAs::Review).unwrap());
    let card = get_flashcard(&env.conn, id).unwrap().unwrap();
    assert!(!card.viewed);
    assert_eq!(card.mark_as, MarkAs::Review);

    assert!(!set_flashcard_status(&env.conn, 999, true, MarkAs::Review).unwrap());
  }

  #[test]
  fn test_list_default_order() {
    let env = TestEnv::new().unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::Word, "apple", "manzana")).unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::Verb, "walk", "caminar")).unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::Verb, "eat", "comer")).unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::PhrasalVerb, "give up", "rendirse")).unwrap();

    let words: Vec<String> = list_flashcards(&env.conn, &FlashcardFilter::default())
      .unwrap()
      .into_iter()
      .map(|c| c.word_english)
      .collect();
    assert_eq!(words, vec!["give up", "eat", "walk", "apple"]);
  }

  #[test]
  fn test_list_filters_and_search() {
    let env = TestEnv::new().unwrap();
    let run = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::Word, "house", "casa")).unwrap();
    insert_flashcard(&env.conn, &sample_card(Category::Verb, "eat", "comer")).unwrap();
    mark_flashcard(&env.conn, run, MarkAs::Learned).unwrap();

    let verbs = list_flashcards(
      &env.conn,
      &FlashcardFilter {
        category: Some(Category::Verb),
        ..Default::default()
      },
    )
    .unwrap();
    assert_eq!(verbs.len(), 2);

    let learned = list_flashcards(
      &env.conn,
      &FlashcardFilter {
        viewed: Some(true),
        mark_as: Some(MarkAs::Learned),
        ..Default::default()
      },
    )
    .unwrap();
    assert_eq!(learned.len(), 1);
    assert_eq!(learned[0].id, run);

    let search = list_flashcards(
      &env.conn,
      &FlashcardFilter {
        query: Some("cas".to_string()),
        ..Default::default()
      },
    )
    .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].word_spanish, "casa");

    let search_and_filter = list_flashcards(
      &env.conn,
      &FlashcardFilter {
        query: Some("verb".to_string()),
        viewed: Some(false),
        ..Default::default()
      },
    )
    .unwrap();
    assert_eq!(search_and_filter.len(), 1);
    assert_eq!(search_and_filter[0].word_english, "eat");
  }

  #[test]
  fn test_delete_flashcard() {
    let env = TestEnv::new().unwrap();
    let id = insert_flashcard(&env.conn, &sample_card(Category::Verb, "run", "correr")).unwrap();
    assert!(delete_flashcard(&env.conn, id).unwrap());
    assert!(!delete_flashcard(&env.conn, id).unwrap());
    assert_eq!(count_flashcards(&env.conn).unwrap(), 0);
  }
}

//! Chapter study cursor.
//!
//! A learner walks a chapter's cards one at a time. The cursor for each
//! chapter lives in the browser session (`pos_<chapter-id>`), together with
//! the slug of the chapter last entered. Everything here is pure session
//! bookkeeping; persisting card marks is the caller's job.

use crate::domain::{chapter_url, Chapter, Flashcard};
use crate::session::SessionData;

/// Button pressed on the study form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyAction {
  Prev,
  Next,
}

impl StudyAction {
  /// Anything other than "prev" (including no value) means "next"
  pub fn from_form(value: Option<&str>) -> Self {
    match value {
      Some("prev") => Self::Prev,
      _ => Self::Next,
    }
  }
}

/// What the study view shows for a cursor value
#[derive(Debug, Clone, PartialEq)]
pub enum StudyPosition<'a> {
  Card {
    card: &'a Flashcard,
    /// 1-based position
    number: usize,
    total: usize,
    progress_percent: u32,
  },
  /// Cursor at or past the end: nothing left to show
  Finished { total: usize },
}

/// Apply the entry rule for a chapter view.
///
/// The cursor restarts at 0 when `restart` is requested or when the learner
/// arrives from a different chapter. Returns true when the cursor was reset.
pub fn enter_chapter(session: &mut SessionData, chapter: &Chapter, restart: bool) -> bool {
  let switched = session.current_chapter.as_deref() != Some(chapter.slug.as_str());
  if restart || switched {
    session.set_position(chapter.id, 0);
    session.current_chapter = Some(chapter.slug.clone());
    return true;
  }
  false
}

/// Resolve the cursor against the chapter's ordered cards
pub fn position_view(cards: &[Flashcard], pos: usize) -> StudyPosition<'_> {
  let total = cards.len();
  match cards.get(pos) {
    Some(card) => StudyPosition::Card {
      card,
      number: pos + 1,
      total,
      progress_percent: progress_percent(pos + 1, total),
    },
    None => StudyPosition::Finished { total },
  }
}

/// Percentage of the chapter reached at 1-based position `number`, rounded half to even
pub fn progress_percent(number: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  let pct = (number as f64 / total as f64) * 100.0;
  pct.round_ties_even().clamp(0.0, 100.0) as u32
}

/// Move the cursor back one card, never below 0. Returns the new cursor.
pub fn step_back(session: &mut SessionData, chapter_id: i64) -> usize {
  let pos = session.position(chapter_id).saturating_sub(1);
  session.set_position(chapter_id, pos);
  pos
}

/// Index of the card a "next" submission marks, or None when the cursor is past the end
pub fn card_to_mark(session: &SessionData, chapter_id: i64, total: usize) -> Option<usize> {
  let pos = session.position(chapter_id);
  (pos < total).then_some(pos)
}

/// Move the cursor forward one card after the current card was marked. Returns the new cursor.
pub fn advance(session: &mut SessionData, chapter_id: i64) -> usize {
  let pos = session.position(chapter_id) + 1;
  session.set_position(chapter_id, pos);
  pos
}

/// Reset the cursor to the first card and make this the current chapter
pub fn restart(session: &mut SessionData, chapter: &Chapter) {
  session.set_position(chapter.id, 0);
  session.current_chapter = Some(chapter.slug.clone());
}

/// Where to go after a "next" submission
pub fn next_redirect(chapter: &Chapter, pos: usize, total: usize) -> String {
  if pos >= total {
    finished_url(&chapter.slug)
  } else {
    // `pos` is informational only; the session cursor stays authoritative
    format!("{}?pos={}", chapter_url(&chapter.slug), pos + 1)
  }
}

pub fn finished_url(slug: &str) -> String {
  format!("/capitulos/{}/finished/", slug)
}

/// Endpoint that resets a chapter's progress
pub fn restart_url(slug: &str) -> String {
  format!("/capitulos/{}/restart/", slug)
}

/// Where a restart lands: the chapter view with the cursor reset
pub fn restart_target(slug: &str) -> String {
  format!("{}?restart=1", chapter_url(slug))
}

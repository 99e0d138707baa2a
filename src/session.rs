//! Simple in-memory session storage.
//!
//! Each browser gets a random session ID in a cookie; the server keeps the
//! per-session state (study positions, current chapter, admin login) keyed by
//! that ID. Sessions auto-expire after a configurable duration of inactivity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use crate::config;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "vn_session";

/// State carried for one browser session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
  /// Cursor per chapter id (`pos_<chapter-id>`)
  positions: HashMap<i64, usize>,
  /// Slug of the chapter last entered, used to detect chapter switches
  pub current_chapter: Option<String>,
  /// Logged-in admin username
  pub admin_username: Option<String>,
}

impl SessionData {
  /// Cursor for a chapter, 0 when never set
  pub fn position(&self, chapter_id: i64) -> usize {
    self.positions.get(&chapter_id).copied().unwrap_or(0)
  }

  pub fn set_position(&mut self, chapter_id: i64, pos: usize) {
    self.positions.insert(chapter_id, pos);
  }
}

/// Session entry with last access time for expiration
struct SessionEntry {
  data: SessionData,
  last_access: DateTime<Utc>,
}

/// Shared session store
#[derive(Clone)]
pub struct SessionStore {
  sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
  expiry: Duration,
}

impl SessionStore {
  pub fn new(expiry_hours: i64) -> Self {
    Self {
      sessions: Arc::new(Mutex::new(HashMap::new())),
      expiry: Duration::hours(expiry_hours),
    }
  }

  /// Get the session for the given ID, creating an empty one if unknown
  pub fn load(&self, session_id: &str) -> SessionData {
    // A poisoned store only ever holds plain data, so keep using it
    let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions, self.expiry);
    }

    let now = Utc::now();
    match sessions.get_mut(session_id) {
      Some(entry) if entry.last_access > now - self.expiry => {
        entry.last_access = now;
        entry.data.clone()
      }
      _ => {
        let data = SessionData::default();
        sessions.insert(
          session_id.to_string(),
          SessionEntry {
            data: data.clone(),
            last_access: now,
          },
        );
        data
      }
    }
  }

  /// Store a session
  pub fn save(&self, session_id: &str, data: SessionData) {
    let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
    sessions.insert(
      session_id.to_string(),
      SessionEntry {
        data,
        last_access: Utc::now(),
      },
    );
  }

  /// Forget a session entirely
  pub fn remove(&self, session_id: &str) {
    let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
    sessions.remove(session_id);
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().map(|s| s.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>, expiry: Duration) {
  let cutoff = Utc::now() - expiry;
  sessions.retain(|_, entry| entry.last_access > cutoff);
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// The current browser session, loaded from the cookie (or freshly created).
///
/// Handlers mutate `data` and call [`Session::commit`], returning the jar with
/// the response so a new session's cookie reaches the browser.
pub struct Session {
  id: String,
  pub data: SessionData,
  store: SessionStore,
  jar: CookieJar,
}

impl Session {
  /// Move the session data to a fresh id and drop the old one (admin login)
  pub fn regenerate_id(&mut self) {
    let old = std::mem::replace(&mut self.id, generate_session_id());
    self.store.remove(&old);
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Persist the session data and return the cookie jar carrying the session cookie
  pub fn commit(self) -> CookieJar {
    self.store.save(&self.id, self.data);
    let cookie = Cookie::build((SESSION_COOKIE_NAME, self.id))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .build();
    self.jar.add(cookie)
  }
}

impl FromRequestParts<AppState> for Session {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let id = jar
      .get(SESSION_COOKIE_NAME)
      .map(|c| c.value().to_string())
      .filter(|v| !v.is_empty())
      .unwrap_or_else(generate_session_id);
    let data = state.sessions.load(&id);

    Ok(Session {
      id,
      data,
      store: state.sessions.clone(),
      jar,
    })
  }
}

//! Shared setup for HTTP tests: a router over a temporary database, plus a
//! tiny cookie-carrying client so a test behaves like one browser.

#![allow(dead_code)]

use axum_extra::extract::cookie::Cookie;
use axum_test::multipart::MultipartForm;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use std::sync::MutexGuard;
use tempfile::TempDir;

use vocab_notebook::auth::db::ensure_bootstrap_admin;
use vocab_notebook::config::{AppConfig, BootstrapAdmin};
use vocab_notebook::db::{self, DbPool};
use vocab_notebook::domain::{Category, ChapterDraft, FlashcardDraft, TestDraft};
use vocab_notebook::routes;
use vocab_notebook::session::SESSION_COOKIE_NAME;
use vocab_notebook::state::AppState;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct TestApp {
  pub server: TestServer,
  pub db: DbPool,
  pub temp: TempDir,
  cookie: Option<Cookie<'static>>,
}

impl TestApp {
  pub fn new() -> Self {
    Self::with_quiz(true)
  }

  pub fn with_quiz(quiz_enabled: bool) -> Self {
    let temp = TempDir::new().unwrap();
    let admin = BootstrapAdmin {
      username: ADMIN_USERNAME.to_string(),
      password: ADMIN_PASSWORD.to_string(),
    };
    let config = AppConfig {
      database_path: temp.path().join("vocab.db"),
      media_dir: temp.path().join("media"),
      quiz_enabled,
      bootstrap_admin: Some(admin.clone()),
      ..Default::default()
    };

    let pool = db::init_db(&config.database_path).unwrap();
    {
      let conn = pool.lock().unwrap();
      ensure_bootstrap_admin(&conn, &admin).unwrap();
    }

    let server = TestServer::new(routes::router(AppState::new(pool.clone(), config))).unwrap();
    Self {
      server,
      db: pool,
      temp,
      cookie: None,
    }
  }

  pub fn conn(&self) -> MutexGuard<'_, Connection> {
    self.db.lock().unwrap()
  }

  pub fn card(&self, english: &str, spanish: &str) -> i64 {
    let draft = FlashcardDraft {
      category: Category::Word,
      word_english: english.to_string(),
      word_spanish: spanish.to_string(),
      mean_english: format!("meaning of {}", english),
      mean_espanish: format!("significado de {}", spanish),
      ..Default::default()
    };
    db::insert_flashcard(&self.conn(), &draft).unwrap()
  }

  pub fn chapter(&self, title: &str, slug: &str, card_ids: &[i64]) -> i64 {
    let draft = ChapterDraft {
      title: title.to_string(),
      slug: slug.to_string(),
      card_ids: card_ids.to_vec(),
      ..Default::default()
    };
    db::insert_chapter(&self.conn(), &draft).unwrap()
  }

  pub fn test(&self, title: &str, slug: &str, question_ids: &[i64], num_questions: u32) -> i64 {
    let draft = TestDraft {
      title: title.to_string(),
      slug: slug.to_string(),
      question_ids: question_ids.to_vec(),
      num_questions,
      ..Default::default()
    };
    db::insert_test(&self.conn(), &draft).unwrap()
  }

  /// Three cards (apple, book, cat) in a chapter with slug `basics`
  pub fn basics(&self) -> (i64, Vec<i64>) {
    let ids = vec![
      self.card("apple", "manzana"),
      self.card("book", "libro"),
      self.card("cat", "gato"),
    ];
    (self.chapter("Basics", "basics", &ids), ids)
  }

  pub fn session_cookie(&self) -> Option<Cookie<'static>> {
    self.cookie.clone()
  }

  pub async fn get(&mut self, path: &str) -> TestResponse {
    let mut request = self.server.get(path);
    if let Some(cookie) = &self.cookie {
      request = request.add_cookie(cookie.clone());
    }
    let response = request.await;
    self.remember(&response);
    response
  }

  pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
    let mut request = self.server.post(path).form(&form);
    if let Some(cookie) = &self.cookie {
      request = request.add_cookie(cookie.clone());
    }
    let response = request.await;
    self.remember(&response);
    response
  }

  pub async fn post_multipart(&mut self, path: &str, form: MultipartForm) -> TestResponse {
    let mut request = self.server.post(path).multipart(form);
    if let Some(cookie) = &self.cookie {
      request = request.add_cookie(cookie.clone());
    }
    let response = request.await;
    self.remember(&response);
    response
  }

  pub async fn login(&mut self) {
    let response = self
      .post(
        "/admin/login",
        &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD), ("next", "/admin/")],
      )
      .await;
    assert_eq!(location(&response), "/admin/");
  }

  fn remember(&mut self, response: &TestResponse) {
    if let Some(cookie) = response.maybe_cookie(SESSION_COOKIE_NAME) {
      self.cookie = Some(cookie);
    }
  }
}

/// Redirect target of a 303 response
pub fn location(response: &TestResponse) -> String {
  response.assert_status(axum::http::StatusCode::SEE_OTHER);
  response.header("location").to_str().unwrap().to_string()
}

//! Application state shared by every handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
  /// Shared database connection
  pub db: DbPool,

  /// Per-browser session state
  pub sessions: SessionStore,

  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(db: DbPool, config: AppConfig) -> Self {
    Self {
      db,
      sessions: SessionStore::new(config.session_expiry_hours),
      config: Arc::new(config),
    }
  }
}
